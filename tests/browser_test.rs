// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use lighthttp::{
    Cookie, DefaultWebBrowser, EntityEnclosingWebRequest, Error, MultiThreadWebBrowser,
    ThreadLocalWebBrowser, WebBrowser, WebRequest,
};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn get_sends_default_and_request_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/headers"))
        .and(header("x-default", "browser"))
        .and(header("x-token", "request"))
        .and(header("user-agent", "lighthttp-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    browser.add_header("X-Default", "browser");
    browser.add_header("X-Token", "browser");
    browser.add_header("User-Agent", "lighthttp-test");

    let request = WebRequest::get(format!("{}/headers", server.uri())).header("x-token", "request");
    let response = browser.execute(&request).await.unwrap();

    assert_eq!(response.response_code(), 200);
    assert_eq!(response.text().unwrap(), "ok");
    assert!(!response.redirected());
}

#[tokio::test]
async fn get_params_go_to_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust lang"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    let request = WebRequest::get(format!("{}/search", server.uri()))
        .param("q", "rust lang")
        .param("page", "2");

    let response = browser.execute(&request).await.unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn post_form_is_url_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/post"))
        .and(header(
            "content-type",
            "application/x-www-form-urlencoded; charset=UTF-8",
        ))
        .and(body_string("email=sss%40ggg.com&name=aaa+bbb"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    let mut request = EntityEnclosingWebRequest::post(format!("{}/post", server.uri()));
    request
        .add_form_param("email", "sss@ggg.com")
        .add_form_param("name", "aaa bbb");

    let response = browser.execute(&request).await.unwrap();
    assert_eq!(response.response_code(), 201);
}

#[tokio::test]
async fn post_form_in_other_charset() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/put"))
        .and(header(
            "content-type",
            "application/x-www-form-urlencoded; charset=windows-1251",
        ))
        .and(body_string("word=%EF%F0%E8%E2%E5%F2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    let mut request = EntityEnclosingWebRequest::put(format!("{}/put", server.uri()));
    request.add_form_params_with_charset([("word", "привет")], "windows-1251");

    browser.execute(&request).await.unwrap();
}

#[tokio::test]
async fn multipart_file_and_text_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(|req: &Request| {
            let body = String::from_utf8_lossy(&req.body);
            body.contains("name=\"file\"")
                && body.contains("filename=\"data.txt\"")
                && body.contains("file contents")
                && body.contains("name=\"note\"")
                && body.contains("hello")
        })
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("data.txt");
    std::fs::write(&file_path, "file contents").unwrap();

    let browser = DefaultWebBrowser::new();
    // multipart must win over a stale content type
    browser.add_header("Content-Type", "text/plain");

    let mut request = EntityEnclosingWebRequest::post(format!("{}/upload", server.uri()));
    request
        .add_file_part("file", &file_path, Some("text/plain"), None, None)
        .add_text_part("note", "hello", None);

    let response = browser.execute(&request).await.unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn gzip_body_is_decompressed() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"compressed payload").unwrap();
    let gzipped = encoder.finish().unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gzip"))
        .and(header("accept-encoding", "gzip"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Encoding", "gzip")
                .set_body_bytes(gzipped),
        )
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    browser.add_header("Accept-Encoding", "gzip");

    let response = browser
        .get(&format!("{}/gzip", server.uri()))
        .await
        .unwrap();
    assert_eq!(response.text().unwrap(), "compressed payload");
    assert_eq!(response.header("content-encoding"), Some("gzip"));
}

#[tokio::test]
async fn deflate_body_is_decompressed() {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"deflated payload").unwrap();
    let deflated = encoder.finish().unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deflate"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Encoding", "deflate")
                .set_body_bytes(deflated),
        )
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    let response = browser
        .get(&format!("{}/deflate", server.uri()))
        .await
        .unwrap();
    assert_eq!(response.text().unwrap(), "deflated payload");
    assert_eq!(response.header("content-encoding"), Some("deflate"));
}

#[tokio::test]
async fn text_uses_server_or_expected_charset() {
    let server = MockServer::start().await;
    // "привет" in windows-1251
    let body = vec![0xEF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
    Mock::given(method("GET"))
        .and(path("/cp1251"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "text/html; charset=windows-1251"),
        )
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    let url = format!("{}/cp1251", server.uri());

    let response = browser.get(&url).await.unwrap();
    assert!(response
        .charset()
        .unwrap()
        .eq_ignore_ascii_case("windows-1251"));
    assert_eq!(response.text().unwrap(), "привет");

    let response = browser.get_with_charset(&url, "ISO-8859-1").await.unwrap();
    assert_eq!(response.charset(), Some("ISO-8859-1"));
    assert_ne!(response.text().unwrap(), "привет");
}

#[tokio::test]
async fn cookies_are_stored_and_sent_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "sid=abc123; Path=/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("cookie", "sid=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .expect(1)
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    browser.get(&format!("{}/login", server.uri())).await.unwrap();
    assert_eq!(browser.cookie_by_name("sid").unwrap().value, "abc123");

    let response = browser
        .get(&format!("{}/profile", server.uri()))
        .await
        .unwrap();
    assert_eq!(response.text().unwrap(), "welcome");
}

#[tokio::test]
async fn cookie_set_during_redirect_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/landing")
                .insert_header("Set-Cookie", "visited=yes; Path=/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .and(header("cookie", "visited=yes"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    let response = browser.get(&format!("{}/start", server.uri())).await.unwrap();

    assert!(response.redirected());
    assert_eq!(response.url().path(), "/landing");
    assert!(browser.cookie_by_name("visited").is_some());
}

#[tokio::test]
async fn added_cookie_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("cookie", "token=xyz"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    browser.add_cookie(Cookie::new("127.0.0.1", "token", "xyz"));
    browser.get(&format!("{}/", server.uri())).await.unwrap();

    browser.clear_all_cookies();
    assert!(browser.cookies().is_empty());
}

#[tokio::test]
async fn injected_client_still_uses_cookie_jar() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/set"))
        .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "a=1"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/check"))
        .and(header("cookie", "a=1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    browser.set_http_client(reqwest::Client::new());

    browser.get(&format!("{}/set", server.uri())).await.unwrap();
    browser.get(&format!("{}/check", server.uri())).await.unwrap();
}

#[tokio::test]
async fn http_error_status_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    let response = browser.get(&server.uri()).await.unwrap();
    assert!(response.is_server_error());
}

#[tokio::test]
async fn connection_failures_are_retried() {
    let url = format!("http://127.0.0.1:{}/", closed_port());
    let browser = DefaultWebBrowser::new();
    browser.set_retry_count(2);

    match browser.get(&url).await {
        Err(Error::RetriesExhausted { attempts, source, .. }) => {
            assert_eq!(attempts, 3);
            assert!(source.is_network());
        }
        other => panic!("expected exhausted retries, got {:?}", other),
    }

    browser.set_retry_count(0);
    let err = browser.get(&url).await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn unknown_host_is_not_retried() {
    let browser = DefaultWebBrowser::new();
    browser.clear_proxy();
    browser.set_retry_count(2);

    let err = browser
        .get("http://lighthttp-missing-host.invalid/")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)), "got {:?}", err);
    assert!(err.is_unknown_host());
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn socket_timeout_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(1)
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    browser.set_socket_timeout(Duration::from_millis(200));

    let err = browser.get(&server.uri()).await.unwrap_err();
    assert!(err.is_timeout());
    assert!(err.url().is_some());
}

#[tokio::test]
async fn abort_cancels_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let browser = Arc::new(DefaultWebBrowser::thread_safe());
    let url = server.uri();
    let task = {
        let browser = browser.clone();
        tokio::spawn(async move { browser.get(&url).await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    browser.abort();

    let err = task.await.unwrap().unwrap_err();
    assert!(err.is_aborted());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn multi_thread_abort_only_cancels_calling_thread() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(1)))
        .mount(&server)
        .await;

    let browser = Arc::new(MultiThreadWebBrowser::new());
    let url = server.uri();

    let run_on_thread = |aborting: bool| {
        let browser = browser.clone();
        let url = url.clone();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                if !aborting {
                    return browser.get(&url).await;
                }
                let (result, _) = tokio::join!(browser.get(&url), async {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    browser.abort();
                });
                result
            })
        })
    };

    let survivor = run_on_thread(false);
    let aborted = run_on_thread(true);

    let aborted = tokio::task::spawn_blocking(move || aborted.join().unwrap())
        .await
        .unwrap();
    let survivor = tokio::task::spawn_blocking(move || survivor.join().unwrap())
        .await
        .unwrap();

    assert!(aborted.unwrap_err().is_aborted());
    assert_eq!(survivor.unwrap().status().as_u16(), 200);
}

#[tokio::test]
async fn proxy_is_applied_and_cleared() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    browser.set_retry_count(0);
    browser.get(&server.uri()).await.unwrap();

    browser.set_proxy("127.0.0.1", closed_port()).unwrap();
    let err = browser.get(&server.uri()).await.unwrap_err();
    assert!(err.is_network());

    browser.clear_proxy();
    browser.get(&server.uri()).await.unwrap();
}

#[tokio::test]
async fn referer_taken_from_previous_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/item/1"))
        .and(header("referer", format!("{}/list", server.uri()).as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let browser = DefaultWebBrowser::new();
    let list = browser.get(&format!("{}/list", server.uri())).await.unwrap();

    let mut request = WebRequest::delete(format!("{}/item/1", server.uri()));
    request.set_referer_from(&list);
    let response = browser.execute(&request).await.unwrap();
    assert_eq!(response.response_code(), 204);
}

#[tokio::test]
async fn thread_local_instance_issues_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-local", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let browser = ThreadLocalWebBrowser::instance();
    browser.add_header("X-Local", "1");
    let response = browser.get(&server.uri()).await.unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn multi_thread_browser_shares_cookies_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "sid=shared"))
        .mount(&server)
        .await;

    let browser = Arc::new(MultiThreadWebBrowser::new());
    browser.add_header("X-App", "lighthttp");
    browser
        .get(&format!("{}/login", server.uri()))
        .await
        .unwrap();

    let other = browser.clone();
    let (cookie, header) = std::thread::spawn(move || {
        (other.current().cookie_by_name("sid"), other.header("x-app"))
    })
    .join()
    .unwrap();

    assert_eq!(cookie.unwrap().value, "shared");
    assert_eq!(header.as_deref(), Some("lighthttp"));
}
