// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed route table of the driver protocol.

use http::Method;

/// Logical name of a driver operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Activate,
    Get,
    Path,
    Create,
    Mount,
    Unmount,
    Remove,
}

impl std::fmt::Display for RouteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RouteName::Activate => "activate",
            RouteName::Get => "get",
            RouteName::Path => "path",
            RouteName::Create => "create",
            RouteName::Mount => "mount",
            RouteName::Unmount => "unmount",
            RouteName::Remove => "remove",
        };
        write!(f, "{s}")
    }
}

/// One (method, path) pairing.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: RouteName,
    /// Method clients use. The server additionally accepts GET on the Get route.
    pub method: Method,
    pub path: &'static str,
}

static ROUTES: [Route; 7] = [
    Route {
        name: RouteName::Activate,
        method: Method::POST,
        path: "/Plugin.Activate",
    },
    Route {
        name: RouteName::Get,
        method: Method::POST,
        path: "/VolumeDriver.Get",
    },
    Route {
        name: RouteName::Path,
        method: Method::POST,
        path: "/VolumeDriver.Path",
    },
    Route {
        name: RouteName::Create,
        method: Method::POST,
        path: "/VolumeDriver.Create",
    },
    Route {
        name: RouteName::Mount,
        method: Method::POST,
        path: "/VolumeDriver.Mount",
    },
    Route {
        name: RouteName::Unmount,
        method: Method::POST,
        path: "/VolumeDriver.Unmount",
    },
    Route {
        name: RouteName::Remove,
        method: Method::POST,
        path: "/VolumeDriver.Remove",
    },
];

/// The full route table.
pub fn routes() -> &'static [Route] {
    &ROUTES
}

/// Looks up the route for `name`. The table is total, so this never misses.
pub fn route(name: RouteName) -> &'static Route {
    match name {
        RouteName::Activate => &ROUTES[0],
        RouteName::Get => &ROUTES[1],
        RouteName::Path => &ROUTES[2],
        RouteName::Create => &ROUTES[3],
        RouteName::Mount => &ROUTES[4],
        RouteName::Unmount => &ROUTES[5],
        RouteName::Remove => &ROUTES[6],
    }
}
