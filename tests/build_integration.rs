//! End-to-end builds through the public API, from a bare directory to a
//! browsable dist tree.

use mdpress::engine::{Engine, EngineConfig};
use mdpress::scaffold;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
}

/// A hand-rolled site with deliberately simple templates, so assertions
/// can match whole pages.
fn fixture_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write(
        root,
        ".theme/templates/dir.html",
        "<h1>{{ node.title }}</h1><ul>{% for c in node.children %}\
         <li><a href=\"{{ c.path }}\">{{ c.title }}</a> {{ c.date }}</li>{% endfor %}</ul>",
    );
    write(
        root,
        ".theme/templates/file.html",
        "<p>{{ node.date }} by {{ node.author }}</p>{{ render(node.content()) }}",
    );
    write(root, ".theme/assets/style.css", "body { margin : 0 ; }\n");

    write(root, "docs/index.md", "Welcome home.\n");
    write(root, "docs/2023-06-01-newest.md", "# Newest\n\nFresh.\n");
    write(root, "docs/2021-03-03-older.md", "# Older\n\nAged.\n");
    write(root, "docs/archive/2019-01-01-ancient.md", "# Ancient\n");
    write(root, "meta.yaml", "title: Fixture Site\n");
    tmp
}

#[test]
fn build_produces_the_expected_page_tree() {
    let site = fixture_site();
    let engine = Engine::new(EngineConfig {
        source: site.path().to_path_buf(),
        author: Some("Ada".to_string()),
        ..EngineConfig::default()
    });

    let pages = engine.run().unwrap();
    let names: Vec<&str> = pages.iter().map(|p| p.name.as_str()).collect();
    // Descending by date: newest, older, then the 2019 archive branch.
    assert_eq!(names, vec!["home", "newest", "older", "archive", "ancient"]);

    let dist = site.path().join("dist");
    assert!(dist.join("index.html").is_file());
    assert!(dist.join("newest/index.html").is_file());
    assert!(dist.join("older/index.html").is_file());
    assert!(dist.join("archive/index.html").is_file());
    assert!(dist.join("archive/ancient/index.html").is_file());
}

#[test]
fn home_page_lists_children_newest_first() {
    let site = fixture_site();
    let engine = Engine::new(EngineConfig {
        source: site.path().to_path_buf(),
        ..EngineConfig::default()
    });
    engine.run().unwrap();

    let home = fs::read_to_string(site.path().join("dist/index.html")).unwrap();
    assert_eq!(
        home,
        "<h1>Home</h1><ul>\
         <li><a href=\"/newest/\">Newest</a> 2023-06-01</li>\
         <li><a href=\"/older/\">Older</a> 2021-03-03</li>\
         <li><a href=\"/archive/\">Archive</a> 2019-01-01</li></ul>"
    );
}

#[test]
fn leaf_page_carries_date_author_and_content() {
    let site = fixture_site();
    let engine = Engine::new(EngineConfig {
        source: site.path().to_path_buf(),
        author: Some("Ada".to_string()),
        ..EngineConfig::default()
    });
    engine.run().unwrap();

    let page = fs::read_to_string(site.path().join("dist/newest/index.html")).unwrap();
    assert!(page.contains("<p>2023-06-01 by Ada</p>"), "{page}");
    assert!(page.contains("Fresh."), "{page}");
}

#[test]
fn context_path_prefixes_every_link() {
    let site = fixture_site();
    let engine = Engine::new(EngineConfig {
        source: site.path().to_path_buf(),
        context_path: Some("/blog".to_string()),
        ..EngineConfig::default()
    });
    engine.run().unwrap();

    let home = fs::read_to_string(site.path().join("dist/index.html")).unwrap();
    assert!(home.contains("href=\"/blog/newest/\""), "{home}");
    assert!(home.contains("href=\"/blog/archive/\""), "{home}");
    assert!(!home.contains("href=\"/newest/\""), "{home}");
}

#[test]
fn assets_are_copied_and_minified() {
    let site = fixture_site();
    let engine = Engine::new(EngineConfig {
        source: site.path().to_path_buf(),
        ..EngineConfig::default()
    });
    engine.run().unwrap();

    let css = fs::read_to_string(site.path().join("dist/assets/style.css")).unwrap();
    assert_eq!(css, "body{margin :0;}");
    assert!(site.path().join("dist/assets/highlight.css").is_file());
}

#[test]
fn init_then_build_round_trips() {
    let tmp = TempDir::new().unwrap();
    scaffold::init_project(tmp.path(), "Round Trip").unwrap();

    let engine = Engine::new(EngineConfig {
        source: tmp.path().to_path_buf(),
        ..EngineConfig::default()
    });
    let pages = engine.run().unwrap();
    assert_eq!(pages.len(), 2);

    let home = fs::read_to_string(tmp.path().join("dist/index.html")).unwrap();
    assert!(home.contains("Round Trip"), "{home}");
    assert!(home.contains("href=\"/hello-world/\""), "{home}");
}

#[test]
fn renamed_document_leaves_no_stale_page() {
    let site = fixture_site();
    let engine = Engine::new(EngineConfig {
        source: site.path().to_path_buf(),
        ..EngineConfig::default()
    });
    engine.run().unwrap();
    assert!(site.path().join("dist/newest/index.html").is_file());

    fs::rename(
        site.path().join("docs/2023-06-01-newest.md"),
        site.path().join("docs/2023-06-01-renamed.md"),
    )
    .unwrap();
    engine.run().unwrap();

    assert!(!site.path().join("dist/newest").exists());
    assert!(site.path().join("dist/renamed/index.html").is_file());
}
