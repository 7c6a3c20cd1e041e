use cityscope_core::config::ExplorerConfig;
use cityscope_core::wiki;
use cityscope_core::City;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

const IMAGE_BYTES: &[u8] = b"\x89PNG-not-really";

/// Minimal HTTP/1.1 responder serving a fake summary API and image host.
fn spawn_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            let mut user_agent = None;
            loop {
                let mut header = String::new();
                match reader.read_line(&mut header) {
                    Ok(0) | Err(_) => break,
                    Ok(_) if header == "\r\n" => break,
                    Ok(_) => {
                        if let Some((name, value)) = header.split_once(':') {
                            if name.eq_ignore_ascii_case("user-agent") {
                                user_agent = Some(value.trim().to_string());
                            }
                        }
                    }
                }
            }

            let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
            let known_agent = user_agent.as_deref() == Some(cityscope_core::USER_AGENT);
            let (status, content_type, body): (&str, &str, Vec<u8>) = match path.as_str() {
                _ if !known_agent => ("403 Forbidden", "text/plain", b"no agent".to_vec()),
                "/summary/Paris" => (
                    "200 OK",
                    "application/json",
                    format!(
                        r#"{{"title":"Paris","thumbnail":{{"source":"http://127.0.0.1:{}/img/320px-Paris.jpg"}}}}"#,
                        port
                    )
                    .into_bytes(),
                ),
                "/summary/Blank" => ("200 OK", "application/json", b"{}".to_vec()),
                "/img/400px-Paris.jpg" => ("200 OK", "image/png", IMAGE_BYTES.to_vec()),
                _ => ("404 Not Found", "text/plain", b"missing".to_vec()),
            };

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                content_type,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        }
    });

    port
}

fn config_for(port: u16) -> ExplorerConfig {
    ExplorerConfig {
        summary_endpoint: format!("http://127.0.0.1:{}/summary/", port),
        thumbnail_width: 400,
        request_timeout_secs: 5,
        use_system_proxy: false,
        ..Default::default()
    }
}

fn local_client(config: &ExplorerConfig) -> reqwest::Client {
    wiki::build_client(config).expect("client builds")
}

fn city(name: &str, wiki: &str) -> City {
    City {
        name: name.to_string(),
        lat: 0.0,
        lon: 0.0,
        population: 1,
        wiki: wiki.to_string(),
    }
}

#[tokio::test]
async fn test_fetch_image_bytes_follows_resized_thumbnail() {
    let port = spawn_server();
    let config = config_for(port);
    let client = local_client(&config);

    let paris = city("Paris", "https://en.wikipedia.org/wiki/Paris");
    let url = wiki::fetch_image_url(&client, &config, &paris).await.unwrap();
    assert_eq!(
        url.as_deref(),
        Some(format!("http://127.0.0.1:{}/img/400px-Paris.jpg", port).as_str())
    );

    let bytes = wiki::fetch_image_bytes(&client, &config, &paris).await.unwrap();
    assert_eq!(bytes.as_deref(), Some(IMAGE_BYTES));
}

#[tokio::test]
async fn test_page_without_image_is_none() {
    let port = spawn_server();
    let config = config_for(port);
    let client = local_client(&config);

    let blank = city("Blank", "");
    assert_eq!(
        wiki::fetch_image_bytes(&client, &config, &blank).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_http_error_is_reported() {
    let port = spawn_server();
    let config = config_for(port);
    let client = local_client(&config);

    let missing = city("Atlantis", "https://en.wikipedia.org/wiki/Atlantis");
    assert!(wiki::fetch_image_bytes(&client, &config, &missing).await.is_err());
}

#[test]
fn test_blocking_lookup_resolves_thumbnail() {
    let port = spawn_server();
    let config = config_for(port);
    let client = wiki::build_blocking_client(&config).unwrap();

    let paris = city("Paris", "https://en.wikipedia.org/wiki/Paris");
    let url = wiki::fetch_image_url_blocking(&client, &config, &paris).unwrap();
    assert_eq!(
        url.as_deref(),
        Some(format!("http://127.0.0.1:{}/img/400px-Paris.jpg", port).as_str())
    );

    let guest = city("Guest", "");
    assert!(wiki::fetch_image_url_blocking(&client, &config, &guest).is_err());
}

#[tokio::test]
async fn test_client_without_agent_is_refused() {
    let port = spawn_server();
    let config = config_for(port);
    let bare = reqwest::Client::builder().no_proxy().build().unwrap();

    let paris = city("Paris", "https://en.wikipedia.org/wiki/Paris");
    assert!(wiki::fetch_image_url(&bare, &config, &paris).await.is_err());
}
