use std::fs;
use std::path::Path;

use capoeira_lyrics::catalog::{CatalogLayout, CatalogLoader, DirSource, MONOLITHIC_PATH};
use capoeira_lyrics::render::{ColumnBody, SongBody};
use capoeira_lyrics::selection::{AuthorRequest, Phase, SelectionController, NO_SONGS_MESSAGE};
use capoeira_lyrics::Language;
use serde_json::{json, Value};

fn song(author: &str, track: &str, title: &str, english: bool) -> Value {
    let mut translations = json!({ "español": [format!("{title} (es)|")] });
    let mut titles = json!({ "português": title, "español": format!("{title} (es)") });
    if english {
        translations["english"] = json!([format!("{title} (en)|")]);
        titles["english"] = json!(format!("{title} (en)"));
    }
    json!({
        "author": author,
        "album": "Capoeira Regional",
        "track": track,
        "type": "Corrido",
        "title": titles,
        "lyrics": { "português": [format!("^{title}|"), "*Iê* camará|"], "translations": translations }
    })
}

fn write_sharded(root: &Path) {
    fs::create_dir_all(root.join("authors")).unwrap();
    fs::write(
        root.join("authors-index.json"),
        json!({
            "authors": [
                { "id": "mestre-x", "name": "Mestre X", "file": "x.json" },
                { "id": "mestre-y", "name": "Mestre Y", "file": "y.json" }
            ]
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        root.join("authors/x.json"),
        json!({
            "songs": [
                song("Mestre X", "Track 2", "Terceira", true),
                song("Mestre X", "Track 1", "Primeira", true),
                song("Mestre X", "Track 1", "Segunda", false),
            ]
        })
        .to_string(),
    )
    .unwrap();
    fs::write(root.join("authors/y.json"), json!({ "songs": [] }).to_string()).unwrap();
}

fn load(controller: &mut SelectionController, loader: &CatalogLoader, author: &str) {
    let AuthorRequest::Fetch(ticket) = controller.select_author(author) else {
        panic!("expected a fetch for {author}");
    };
    let result = loader.songs_by_author(&ticket.author);
    assert!(controller.finish_author(&ticket, result));
}

#[test]
fn both_columns_list_the_same_tracks_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write_sharded(dir.path());
    let loader = CatalogLoader::new(Box::new(DirSource::new(dir.path())), CatalogLayout::Sharded);
    let authors = loader.initialize().unwrap().to_vec();
    assert_eq!(authors.len(), 2);

    let mut controller = SelectionController::new(authors, Language::English);
    load(&mut controller, &loader, "Mestre X");
    assert_eq!(controller.phase(), Phase::Ready);

    let expected = vec![("Track 1".to_string(), 2), ("Track 2".to_string(), 1)];
    assert_eq!(controller.lyrics().song_counts(), expected);
    assert_eq!(controller.translation().song_counts(), expected);

    let lyrics_titles: Vec<Option<&str>> = controller.lyrics().tracks()[0]
        .songs
        .iter()
        .map(|song| song.title.as_deref())
        .collect();
    assert_eq!(lyrics_titles, vec![Some("Primeira"), Some("Segunda")]);

    let english = &controller.translation().tracks()[0].songs;
    assert_eq!(english[0].title.as_deref(), Some("Primeira (en)"));
    assert_eq!(
        english[1].body,
        SongBody::Unavailable("Translation not available for English".to_string())
    );
}

#[test]
fn switching_language_rerenders_without_refetching() {
    let dir = tempfile::tempdir().unwrap();
    write_sharded(dir.path());
    let loader = CatalogLoader::new(Box::new(DirSource::new(dir.path())), CatalogLayout::Sharded);
    let authors = loader.initialize().unwrap().to_vec();
    let mut controller = SelectionController::new(authors, Language::English);
    load(&mut controller, &loader, "Mestre X");
    controller.drain_events();

    // Gone from disk, so only the in-memory songs can serve the re-render.
    fs::remove_file(dir.path().join("authors/x.json")).unwrap();
    controller.select_language("es");

    let spanish = &controller.translation().tracks()[0].songs;
    assert_eq!(spanish[1].title.as_deref(), Some("Segunda (es)"));
    assert!(matches!(spanish[1].body, SongBody::Lyrics(_)));
    assert_eq!(controller.drain_events().len(), 1);

    // The cache answers a repeated selection as well.
    load(&mut controller, &loader, "Mestre X");
    assert_eq!(controller.phase(), Phase::Ready);
}

#[test]
fn author_without_songs_is_an_inline_error() {
    let dir = tempfile::tempdir().unwrap();
    write_sharded(dir.path());
    let loader = CatalogLoader::new(Box::new(DirSource::new(dir.path())), CatalogLayout::Sharded);
    let authors = loader.initialize().unwrap().to_vec();
    let mut controller = SelectionController::new(authors, Language::English);

    load(&mut controller, &loader, "Mestre Y");
    assert_eq!(controller.phase(), Phase::Error);
    assert_eq!(
        controller.lyrics().body,
        ColumnBody::Error(NO_SONGS_MESSAGE.to_string())
    );
}

#[test]
fn monolithic_catalog_feeds_the_same_flow() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(MONOLITHIC_PATH),
        json!({
            "songs": [
                song("Mestre X", "Track 1", "Primeira", true),
                song("Mestre Z", "Track 4", "Outra", true),
            ]
        })
        .to_string(),
    )
    .unwrap();
    let loader = CatalogLoader::new(
        Box::new(DirSource::new(dir.path())),
        CatalogLayout::Monolithic,
    );
    let authors = loader.initialize().unwrap().to_vec();
    let names: Vec<&str> = authors.iter().map(|author| author.name.as_str()).collect();
    assert_eq!(names, vec!["Mestre X", "Mestre Z"]);

    let mut controller = SelectionController::new(authors, Language::Spanish);
    load(&mut controller, &loader, "Mestre Z");
    assert_eq!(
        controller.translation().song_counts(),
        vec![("Track 4".to_string(), 1)]
    );
}

#[test]
fn missing_catalog_is_a_page_level_error() {
    let dir = tempfile::tempdir().unwrap();
    let loader = CatalogLoader::new(Box::new(DirSource::new(dir.path())), CatalogLayout::Sharded);
    let err = loader.initialize().unwrap_err();

    let mut controller = SelectionController::new(Vec::new(), Language::English);
    controller.fail_catalog(&err.to_string());
    assert_eq!(controller.phase(), Phase::Error);
    assert!(matches!(controller.translation().body, ColumnBody::Error(_)));
}
