//! End-to-end tests for Trailmark.
//!
//! These tests build a small two-locale project on disk and check the
//! generated tree.

use std::{fs, path::Path};

use tempfile::TempDir;
use trailmark_core::Config;
use trailmark_generator::Builder;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("has parent")).expect("create dir");
    fs::write(path, content).expect("write file");
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).expect("read output")
}

fn sample_site() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();

    write(
        root,
        "locales/en.json",
        r#"{
            "nav": { "home": "Home" },
            "faq": { "title": "FAQ", "items": [ { "q": "Cost?", "a": "Free" } ] },
            "events": {
                "title": "Upcoming trips",
                "trips": [
                    {
                        "slug": "summer-hike",
                        "title": "Summer Hike",
                        "date": "2024-07-01",
                        "spotsFilled": 4,
                        "spotsTotal": 12,
                        "startLat": 47.61,
                        "bring": ["water", "sunscreen"]
                    },
                    { "slug": "kayak-day", "title": "Kayak Day", "date": "2024-08-10", "bring": [] }
                ]
            }
        }"#,
    );
    write(
        root,
        "locales/zh.json",
        r#"{
            "nav": { "home": "首页" },
            "faq": { "title": "常见问题", "items": [ { "q": "费用？", "a": "免费" } ] },
            "events": {
                "title": "近期活动",
                "trips": [
                    { "slug": "summer-hike", "title": "夏季徒步", "date": "7月1日", "bring": ["水", "防晒霜"] }
                ]
            }
        }"#,
    );
    write(
        root,
        "partials/header.html",
        r#"<header><a href="/">{{nav.home}}</a></header>"#,
    );
    write(
        root,
        "templates/index.html",
        concat!(
            r#"<link rel="stylesheet" href="/src/styles.css">"#,
            "{{> header}}<h2>{{events.title}}</h2>",
            "{{#each events.trips}}<a data-i=\"{{@index}}\" href=\"/{{trip.slug}}/\">{{trip.title}}</a>{{/each}}",
            r#"<script type="module" src="/src/main.js"></script>"#,
        ),
    );
    write(
        root,
        "templates/faq.html",
        "{{> header}}<h1>{{faq.title}}</h1>{{#each faq.items}}<dt>{{item.q}}</dt><dd>{{item.a}}</dd>{{/each}}{{> footer}}",
    );
    write(
        root,
        "templates/event.html",
        concat!(
            "{{> header}}<article id=\"TRIP_SLUG\"><h1>{{trip.title}}</h1>",
            "<time>{{trip.date}}</time><span>{{trip.spotsFilled}}/{{trip.spotsTotal}}</span>",
            "<ul>{{#each trip.bring}}<li>{{this}}</li>{{/each}}</ul>",
            "<div data-lat=\"{{trip.startLat}}\">{{trip.unknown}}</div></article>",
        ),
    );

    dir
}

#[test]
fn test_builds_full_tree() {
    let site = sample_site();
    let out = TempDir::new().expect("temp dir");

    let stats = Builder::new(Config::default(), site.path(), out.path())
        .build()
        .expect("build succeeds");

    // en: index, faq, 2 events; zh: index, faq, 1 event.
    assert_eq!(stats.pages, 7);
    for path in [
        "index.html",
        "faq/index.html",
        "summer-hike/index.html",
        "kayak-day/index.html",
        "zh/index.html",
        "zh/faq/index.html",
        "zh/summer-hike/index.html",
    ] {
        assert!(out.path().join(path).is_file(), "{path} should exist");
    }
}

#[test]
fn test_index_lists_trips_with_partial() {
    let site = sample_site();
    let out = TempDir::new().expect("temp dir");
    Builder::new(Config::default(), site.path(), out.path())
        .build()
        .expect("build succeeds");

    let html = read(out.path(), "index.html");
    assert!(html.contains(r#"<header><a href="/">Home</a></header>"#));
    assert!(html.contains("<h2>Upcoming trips</h2>"));
    assert!(html.contains(
        "<a data-i=\"0\" href=\"/summer-hike/\">Summer Hike</a>\n<a data-i=\"1\" href=\"/kayak-day/\">Kayak Day</a>"
    ));

    let zh = read(out.path(), "zh/index.html");
    assert!(zh.contains("首页"));
    assert!(zh.contains("<a data-i=\"0\" href=\"/summer-hike/\">夏季徒步</a>"));
}

#[test]
fn test_event_page_uses_english_invariants() {
    let site = sample_site();
    let out = TempDir::new().expect("temp dir");
    Builder::new(Config::default(), site.path(), out.path())
        .build()
        .expect("build succeeds");

    let zh = read(out.path(), "zh/summer-hike/index.html");
    assert!(zh.contains(r#"<article id="summer-hike">"#));
    assert!(zh.contains("<h1>夏季徒步</h1>"));
    assert!(zh.contains("<time>2024-07-01</time>"));
    assert!(zh.contains("<span>4/12</span>"));
    assert!(zh.contains("<ul><li>水</li>\n<li>防晒霜</li></ul>"));
    assert!(zh.contains(r#"data-lat="47.61""#));
    assert!(zh.contains("{{trip.unknown}}"));

    let en = read(out.path(), "kayak-day/index.html");
    assert!(en.contains("<ul></ul>"));
    assert!(en.contains("<span>{{trip.spotsFilled}}/{{trip.spotsTotal}}</span>"));
}

#[test]
fn test_missing_partial_left_visible() {
    let site = sample_site();
    let out = TempDir::new().expect("temp dir");
    Builder::new(Config::default(), site.path(), out.path())
        .build()
        .expect("build succeeds");

    let faq = read(out.path(), "zh/faq/index.html");
    assert!(faq.contains("<h1>常见问题</h1><dt>费用？</dt><dd>免费</dd>"));
    assert!(faq.ends_with("{{> footer}}"));
}

#[test]
fn test_production_build_rewrites_assets() {
    let site = sample_site();
    let out = TempDir::new().expect("temp dir");
    write(
        out.path(),
        ".vite/manifest.json",
        r#"{ "index.html": { "file": "assets/main-abc123.js", "css": ["assets/styles-def456.css"] } }"#,
    );

    let stats = Builder::new(Config::default(), site.path(), out.path())
        .build()
        .expect("build succeeds");
    assert!(stats.rewrote_assets);

    let html = read(out.path(), "index.html");
    assert!(html.contains(r#"href="/assets/styles-def456.css""#));
    assert!(html.contains(r#"src="/assets/main-abc123.js""#));
}

#[test]
fn test_without_manifest_sources_stay() {
    let site = sample_site();
    let out = TempDir::new().expect("temp dir");

    let stats = Builder::new(Config::default(), site.path(), out.path())
        .build()
        .expect("build succeeds");
    assert!(!stats.rewrote_assets);

    let html = read(out.path(), "zh/index.html");
    assert!(html.contains(r#"href="/src/styles.css""#));
    assert!(html.contains(r#"src="/src/main.js""#));
}

#[test]
fn test_dev_build_ignores_manifest() {
    let site = sample_site();
    write(
        site.path(),
        ".vite/manifest.json",
        r#"{ "index.html": { "file": "assets/main.js", "css": ["assets/styles.css"] } }"#,
    );

    Builder::new(Config::default(), site.path(), site.path())
        .build()
        .expect("build succeeds");

    let html = read(site.path(), "index.html");
    assert!(html.contains(r#"href="/src/styles.css""#));
}

#[test]
fn test_custom_config_layout() {
    let site = sample_site();
    fs::rename(site.path().join("templates"), site.path().join("pages")).expect("rename");

    let mut config = Config::default();
    config.paths.templates = "pages".into();
    config.site.event_template = "index".into();

    let out = TempDir::new().expect("temp dir");
    let stats = Builder::new(config, site.path(), out.path())
        .build()
        .expect("build succeeds");

    // index now renders per trip; event and faq render once per locale.
    assert_eq!(stats.pages, 7);
    assert!(out.path().join("event/index.html").is_file());
    assert!(out.path().join("zh/summer-hike/index.html").is_file());
    assert!(!out.path().join("index.html").exists());
}
