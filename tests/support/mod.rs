//! Shared fixtures for integration tests: mock site pages and image bodies.

#![allow(dead_code)]

use std::io::Cursor;

use harvester_core::{AcceptancePolicy, DriverSettings, PolitenessDelays, ResolveStrategy};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// PNG of the given size filled with pseudo-random noise, so it stays well
/// above the strict byte floor.
pub fn noisy_png(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x2545_F491 ^ width.wrapping_mul(31) ^ height;
    let image = RgbImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        Rgb([r, g, b])
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("encode fixture png");
    buffer.into_inner()
}

/// Search-results page with the given detail item ids and optional next href.
pub fn search_page(item_ids: &[&str], next_href: Option<&str>) -> String {
    let mut html = String::from("<html><body><h1>Search results</h1>");
    for id in item_ids {
        html.push_str(&format!(
            r#"<div class="listing"><a href="/listings/details/index.cfm?itemnum={id}"><img src="/thumbs/{id}.jpg"></a>
               <a href="/listings/details/index.cfm?itemnum={id}">Chinchilla {id}</a></div>"#
        ));
    }
    if let Some(href) = next_href {
        html.push_str(&format!(r#"<a href="{href}">Next &gt;</a>"#));
    }
    html.push_str("</body></html>");
    html
}

/// Detail page holding one full-size photo, its thumbnail and site chrome.
pub fn detail_page(item_id: &str, photo_src: &str) -> String {
    format!(
        r#"<html><body>
            <img src="/img/logo.png">
            <img src="{photo_src}">
            <img src="/thumbs/{item_id}.jpg">
        </body></html>"#
    )
}

/// Mounts an HTML page at `route`.
pub async fn mount_html(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

/// Mounts a detail page for `item_id`.
pub async fn mount_detail(server: &MockServer, item_id: &str, html: String) {
    Mock::given(method("GET"))
        .and(path("/listings/details/index.cfm"))
        .and(query_param("itemnum", item_id))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

/// Mounts binary image bytes at `route`, expecting exactly `hits` requests.
pub async fn mount_image(server: &MockServer, route: &str, body: Vec<u8>, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(hits)
        .mount(server)
        .await;
}

/// Mounts a route that must never be requested.
pub async fn mount_forbidden(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

/// Driver settings without pauses.
pub fn fast_settings(strategy: ResolveStrategy, max_pages: Option<u32>) -> DriverSettings {
    DriverSettings {
        strategy,
        policy: AcceptancePolicy::default(),
        delays: PolitenessDelays::none(),
        max_pages,
        ..DriverSettings::default()
    }
}

/// Sorted file names in `dir`, empty when it does not exist.
pub fn file_names(dir: &std::path::Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|entry| {
            entry
                .expect("read dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
