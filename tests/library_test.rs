use rnovel::{
    catalog::ChapterId,
    library::Library,
    location::Location,
    reader::{Body, Reader},
    render::RenderMode,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn novel_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/novel/data/toc.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "title": "The Beginning"},
            {"id": 2, "title": "The Middle"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/novel/data/1.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"content": "# One\n\nOnce upon a time."})),
        )
        .mount(&server)
        .await;

    server
}

fn location(server: &MockServer, suffix: &str) -> Location {
    Location::parse(&format!("{}/novel/{}", server.uri(), suffix)).unwrap()
}

#[tokio::test]
async fn fetches_catalog_and_chapter_over_http() {
    let server = novel_server().await;
    let library = Library::new(location(&server, "index.html?chapter=1"));

    let chapters = library.fetch_catalog().await.unwrap();
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[1].title, "The Middle");

    let chapter = library.fetch_chapter(&chapters[0].id).await.unwrap();
    assert!(chapter.content.contains("Once upon a time."));
}

#[tokio::test]
async fn missing_chapter_is_an_error() {
    let server = novel_server().await;
    let library = Library::new(location(&server, ""));

    assert!(library.fetch_chapter(&ChapterId::new("2")).await.is_err());
}

#[tokio::test]
async fn non_json_catalog_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/toc.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not here</html>"))
        .mount(&server)
        .await;

    let library = Library::new(Location::parse(&server.uri()).unwrap());
    assert!(library.fetch_catalog().await.is_err());
}

#[tokio::test]
async fn deep_link_session_over_http() {
    let server = novel_server().await;
    let start = location(&server, "?chapter=2");
    let library = Library::new(start.clone());
    let mut reader = Reader::new(start, RenderMode::Markdown, 80);

    reader.set_catalog(library.fetch_catalog().await.unwrap());
    let index = reader.startup_index().unwrap();
    assert_eq!(index, 1);

    // chapter 2 is not served
    let request = reader.load_chapter(index).unwrap();
    let outcome = library.fetch_chapter(&request.id).await;
    reader.finish_load(&request, outcome);
    assert_eq!(reader.body(), &Body::Failed);
    assert_eq!(reader.title(), "The Middle");

    let request = reader.prev().unwrap();
    let outcome = library.fetch_chapter(&request.id).await;
    reader.finish_load(&request, outcome);
    assert!(matches!(reader.body(), Body::Ready(_)));
    assert_eq!(reader.location().chapter().as_deref(), Some("1"));
    assert_eq!(reader.location().url().path(), "/novel/");
}

#[tokio::test]
async fn reads_from_a_local_directory() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir(&data).unwrap();
    std::fs::write(data.join("toc.json"), r#"[{"id": "prologue", "title": "Prologue"}]"#).unwrap();
    std::fs::write(data.join("prologue.json"), r#"{"content": "Rain.\n\nThunder."}"#).unwrap();

    let library = Library::new(Location::parse(dir.path().to_str().unwrap()).unwrap());
    let chapters = library.fetch_catalog().await.unwrap();
    assert_eq!(chapters[0].id.as_str(), "prologue");

    let chapter = library.fetch_chapter(&chapters[0].id).await.unwrap();
    assert_eq!(chapter.content, "Rain.\n\nThunder.");

    assert!(library.fetch_chapter(&ChapterId::new("epilogue")).await.is_err());
}
