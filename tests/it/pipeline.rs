use std::time::Duration;

use mockito::Matcher;
use serde_json::json;

use super::*;

#[tokio::test]
async fn success_decodes_typed_value() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embedding")
        .match_header("content-type", "application/json")
        .match_body(Matcher::JsonString(r#"{"content":"Hello world!"}"#.to_string()))
        .with_status(200)
        .with_body(r#"{"embedding":[0.1,0.2]}"#)
        .create_async()
        .await;

    let client = client_for(&server, vec![]);
    let res = client
        .embedding(&EmbeddingRequest::new("Hello world!"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(res.embedding, vec![0.1, 0.2]);
    mock.assert_async().await;
}

#[tokio::test]
async fn any_2xx_is_success() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/tokenize")
        .with_status(202)
        .with_body(r#"{"tokens":[1,2,3]}"#)
        .create_async()
        .await;

    let res = client_for(&server, vec![])
        .tokenize(&TokenizeRequest::new("abc"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(res.tokens, vec![1, 2, 3]);
}

#[tokio::test]
async fn non_2xx_carries_status_and_verbatim_body() {
    let mut server = mockito::Server::new_async().await;
    let body = r#"{"error":{"code":500,"message":"slot unavailable"}}"#;
    let _mock = server
        .mock("POST", "/completion")
        .with_status(500)
        .with_body(body)
        .create_async()
        .await;

    let err = client_for(&server, vec![])
        .completion(
            &CompletionRequest::builder().prompt("hi").build(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, body: got } => {
            assert_eq!(status, 500);
            assert_eq!(got, body);
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_2xx_body_keeps_invalid_utf8_bytes() {
    let mut server = mockito::Server::new_async().await;
    let raw: &[u8] = b"er\xff\xfer";
    let _mock = server
        .mock("POST", "/embedding")
        .with_status(500)
        .with_body(raw)
        .create_async()
        .await;

    let err = client_for(&server, vec![])
        .embedding(&EmbeddingRequest::new("x"), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(&body[..], raw);
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn post_treats_404_as_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/tokenize")
        .with_status(404)
        .with_body("File Not Found")
        .create_async()
        .await;

    let err = client_for(&server, vec![])
        .tokenize(&TokenizeRequest::new("abc"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn shape_mismatch_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/embedding")
        .with_status(200)
        .with_body(r#"{"embedding":"not a vector"}"#)
        .create_async()
        .await;

    let err = client_for(&server, vec![])
        .embedding(&EmbeddingRequest::new("x"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::JSONDeserialize(_)), "{err:?}");
}

#[tokio::test]
async fn props_404_is_not_found_without_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/props")
        .with_status(404)
        .with_body("not here")
        .create_async()
        .await;

    let res = client_for(&server, vec![])
        .props(&CancellationToken::new())
        .await
        .unwrap();
    assert!(res.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn props_other_failures_are_errors() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/props")
        .with_status(503)
        .with_body(r#"{"error":"Loading model"}"#)
        .create_async()
        .await;

    let err = client_for(&server, vec![])
        .props(&CancellationToken::new())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Api { status: 503, ref body } if body == r#"{"error":"Loading model"}"#)
    );
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        LlamaServerClient::new(&format!("http://{addr}"), Duration::from_secs(5), []).unwrap();
    let err = client
        .tokenize(&TokenizeRequest::new("x"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Reqwest(_)), "{err:?}");
    assert!(err.is_transport());
}

#[tokio::test]
async fn timeout_aborts_the_call() {
    let url = silent_server().await;
    let client = LlamaServerClient::new(&url, Duration::from_millis(200), []).unwrap();

    let err = client
        .props(&CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        ClientError::Reqwest(e) => assert!(e.is_timeout(), "{e:?}"),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn cancellation_aborts_in_flight_call() {
    let url = silent_server().await;
    let client = LlamaServerClient::new(&url, Duration::ZERO, []).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = client
        .completion(&CompletionRequest::builder().prompt("x").build(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn response_produced_by_marshaling_decodes_back_equal() {
    let expected = CompletionResponse {
        content: " Paris.".to_string(),
        stop: true,
        model: "m.gguf".to_string(),
        prompt: "The capital of France is".to_string(),
        stopped_word: true,
        stopping_word: "\n".to_string(),
        tokens_evaluated: 6,
        tokens_predicted: 3,
        timings: Some(Timings {
            predicted_n: Some(3),
            predicted_ms: Some(98.25),
            ..Default::default()
        }),
        generation_settings: Some(GenerationSettings {
            settings: CompletionSettings::builder()
                .temperature(0.8)
                .stop(vec!["\n".to_string()])
                .logit_bias(vec![LogitBias::ban(2)])
                .build(),
            model: "m.gguf".to_string(),
            n_ctx: 2048,
        }),
        ..Default::default()
    };

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/completion")
        .with_status(200)
        .with_body(serde_json::to_string(&expected).unwrap())
        .create_async()
        .await;

    let got = client_for(&server, vec![])
        .completion(
            &CompletionRequest::builder().prompt("The capital of France is").build(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(got, expected);
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/tokenize")
        .match_body(Matcher::PartialJson(json!({})))
        .with_status(200)
        .with_body(r#"{"tokens":[7]}"#)
        .expect(8)
        .create_async()
        .await;

    let client = client_for(&server, vec![]);
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .tokenize(&TokenizeRequest::new(format!("call {i}")), &CancellationToken::new())
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().tokens, vec![7]);
    }
    mock.assert_async().await;
}
