//! Static files of the single-page client.

use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

const ASSET_DIRS: [&str; 4] = ["js", "css", "img", "fonts"];

/// Client-side routes rendered by `index.html`.
const CLIENT_ROUTES: [&str; 15] = [
    "/",
    "/info/*rest",
    "/command",
    "/reading",
    "/profile",
    "/schedule",
    "/schedule-event",
    "/schedule-event-info/*rest",
    "/profile-yaml",
    "/addressable",
    "/notification",
    "/subscription",
    "/transmission",
    "/export",
    "/log",
];

pub(super) fn mount(router: Router, assets_dir: &Path) -> Router {
    let index = ServeFile::new(assets_dir.join("index.html"));
    let router = ASSET_DIRS.iter().fold(router, |router, dir| {
        router.nest_service(&format!("/{dir}"), ServeDir::new(assets_dir.join(dir)))
    });
    CLIENT_ROUTES
        .iter()
        .fold(router, |router, route| router.route_service(route, index.clone()))
}
