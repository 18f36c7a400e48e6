use math_agent::core::tools::default_registry;
use math_agent::inference::{
    CompletionProvider, CompletionRequest, Context, OpenRouterProvider, ProviderError, StreamChunk,
    ToolCall,
};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Creates a test context with a directive and one question
fn create_test_context() -> Context {
    let mut context = Context::with_directive("You are a math tutor.");
    context.add_user_message("What is 10 divided by 2?".to_string());
    context
}

/// Collects all chunks from a stream into content and tool calls
async fn collect_chunks(
    mut receiver: mpsc::Receiver<StreamChunk>,
) -> (Vec<String>, Vec<ToolCall>, bool) {
    let mut content_chunks = Vec::new();
    let mut tool_calls = Vec::new();
    let mut completed = false;

    while let Some(chunk) = receiver.recv().await {
        match chunk {
            StreamChunk::Content(s) => content_chunks.push(s),
            StreamChunk::ToolCall(tc) => tool_calls.push(tc),
            StreamChunk::Completed => completed = true,
        }
    }

    (content_chunks, tool_calls, completed)
}

async fn mount_sse(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

/// Serves one chunked response whose body arrives in the given pieces, with a
/// pause between writes so each piece reaches the client separately.
async fn serve_in_pieces(pieces: Vec<Vec<u8>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Consume the request: headers, then Content-Length bytes of body
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
        let content_length: usize = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .map(|v| v.trim().parse().unwrap())
            .unwrap_or(0);
        while request.len() < header_end + content_length {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
        }

        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ntransfer-encoding: chunked\r\n\r\n",
            )
            .await
            .unwrap();
        for piece in pieces {
            socket
                .write_all(format!("{:x}\r\n", piece.len()).as_bytes())
                .await
                .unwrap();
            socket.write_all(&piece).await.unwrap();
            socket.write_all(b"\r\n").await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        socket.write_all(b"0\r\n\r\n").await.unwrap();
        socket.flush().await.unwrap();
    });

    format!("http://{addr}")
}

fn request<'a>(context: &'a Context) -> CompletionRequest<'a> {
    CompletionRequest {
        context,
        model: "test-model",
        tools: &[],
        temperature: 0.0,
        max_output_tokens: Some(512),
    }
}

// ============================================================================
// OpenRouter Provider Tests
// ============================================================================

#[tokio::test]
async fn test_openrouter_successful_streaming_content_only() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
event: response.created
data: {\"type\":\"response.created\"}

event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\"Hello\"}

event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\" world\"}

event: response.completed
data: {\"type\":\"response.completed\"}
";
    mount_sse(&mock_server, sse_response).await;

    let provider = OpenRouterProvider::new("test-key".to_string(), Some(mock_server.uri()));
    let context = create_test_context();

    let (tx, rx) = mpsc::channel(100);
    let result = provider.stream_completion(request(&context), tx).await;
    assert!(result.is_ok());

    let (content, tool_calls, completed) = collect_chunks(rx).await;
    assert_eq!(content, vec!["Hello", " world"]);
    assert!(tool_calls.is_empty());
    assert!(completed);
}

#[tokio::test]
async fn test_openrouter_event_type_inside_data_only() {
    let mock_server = MockServer::start().await;

    // No `event:` lines; the type is read from the JSON payload
    let sse_response = "\
data: {\"type\":\"response.output_text.delta\",\"delta\":\"x = 4\"}

data: {\"type\":\"response.completed\"}

data: [DONE]
";
    mount_sse(&mock_server, sse_response).await;

    let provider = OpenRouterProvider::new("test-key".to_string(), Some(mock_server.uri()));
    let context = create_test_context();

    let (tx, rx) = mpsc::channel(100);
    provider.stream_completion(request(&context), tx).await.unwrap();

    let (content, _, completed) = collect_chunks(rx).await;
    assert_eq!(content, vec!["x = 4"]);
    assert!(completed);
}

#[tokio::test]
async fn test_openrouter_keeps_characters_split_across_chunks() {
    let body = "\
data: {\"type\":\"response.output_text.delta\",\"delta\":\"√2 ≈ 1.414\"}

data: {\"type\":\"response.completed\"}

";
    let bytes = body.as_bytes();
    // cut inside the three-byte encoding of '√', then inside '≈'
    let root = body.find('√').unwrap() + 1;
    let approx = body.find('≈').unwrap() + 2;
    let pieces = vec![
        bytes[..root].to_vec(),
        bytes[root..approx].to_vec(),
        bytes[approx..].to_vec(),
    ];

    let uri = serve_in_pieces(pieces).await;
    let provider = OpenRouterProvider::new("test-key".to_string(), Some(uri));
    let context = create_test_context();

    let (tx, rx) = mpsc::channel(100);
    provider.stream_completion(request(&context), tx).await.unwrap();

    let (content, _, completed) = collect_chunks(rx).await;
    assert_eq!(content.concat(), "√2 ≈ 1.414");
    assert!(!content.concat().contains('\u{FFFD}'));
    assert!(completed);
}

#[tokio::test]
async fn test_openrouter_streams_tool_call() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
event: response.output_item.added
data: {\"type\":\"response.output_item.added\",\"item\":{\"type\":\"function_call\",\"id\":\"fc_1\",\"call_id\":\"call_1\",\"name\":\"calculator\"}}

event: response.function_call_arguments.delta
data: {\"type\":\"response.function_call_arguments.delta\",\"item_id\":\"fc_1\",\"delta\":\"{\\\"a\\\"\"}

event: response.function_call_arguments.done
data: {\"type\":\"response.function_call_arguments.done\",\"item_id\":\"fc_1\",\"arguments\":\"{\\\"a\\\": 10, \\\"b\\\": 2, \\\"operation\\\": \\\"divide\\\"}\"}

event: response.completed
data: {\"type\":\"response.completed\"}
";
    mount_sse(&mock_server, sse_response).await;

    let provider = OpenRouterProvider::new("test-key".to_string(), Some(mock_server.uri()));
    let context = create_test_context();

    let (tx, rx) = mpsc::channel(100);
    provider.stream_completion(request(&context), tx).await.unwrap();

    let (content, tool_calls, _) = collect_chunks(rx).await;
    assert!(content.is_empty());
    assert_eq!(tool_calls.len(), 1);
    assert_eq!(tool_calls[0].id, "fc_1");
    assert_eq!(tool_calls[0].call_id, "call_1");
    assert_eq!(tool_calls[0].name, "calculator");

    // the arguments execute against the real catalog
    let registry = default_registry().unwrap();
    assert_eq!(
        registry.execute(&tool_calls[0]),
        "The division of 10.0 by 2.0 is 5.0"
    );
}

#[tokio::test]
async fn test_openrouter_sends_bearer_key_model_and_tools() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("Authorization", "Bearer sk-or-test"))
        .and(body_string_contains("\"model\":\"meta-llama/llama-3-8b-instruct\""))
        .and(body_string_contains("\"name\":\"solve_quadratic\""))
        .and(body_string_contains("\"temperature\":0.0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("data: {\"type\":\"response.completed\"}\n"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenRouterProvider::new("sk-or-test".to_string(), Some(mock_server.uri()));
    let context = create_test_context();
    let tools = default_registry().unwrap().definitions();
    let request = CompletionRequest {
        context: &context,
        model: "meta-llama/llama-3-8b-instruct",
        tools: &tools,
        temperature: 0.0,
        max_output_tokens: None,
    };

    let (tx, rx) = mpsc::channel(100);
    provider.stream_completion(request, tx).await.unwrap();
    let (_, _, completed) = collect_chunks(rx).await;
    assert!(completed);
}

#[tokio::test]
async fn test_openrouter_api_error_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let provider = OpenRouterProvider::new("invalid-key".to_string(), Some(mock_server.uri()));
    let context = create_test_context();

    let (tx, _rx) = mpsc::channel(100);
    let result = provider.stream_completion(request(&context), tx).await;

    assert!(matches!(result, Err(ProviderError::Api { status: 401, .. })));
}

#[tokio::test]
async fn test_openrouter_malformed_tool_arguments_event_is_parse_error() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
event: response.function_call_arguments.done
data: {\"type\":\"response.function_call_arguments.done\"}
";
    mount_sse(&mock_server, sse_response).await;

    let provider = OpenRouterProvider::new("test-key".to_string(), Some(mock_server.uri()));
    let context = create_test_context();

    let (tx, _rx) = mpsc::channel(100);
    let result = provider.stream_completion(request(&context), tx).await;
    assert!(matches!(result, Err(ProviderError::Parse(_))));
}

#[tokio::test]
async fn test_openrouter_channel_closed_error() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\"Hello\"}

event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\" world\"}
";
    mount_sse(&mock_server, sse_response).await;

    let provider = OpenRouterProvider::new("test-key".to_string(), Some(mock_server.uri()));
    let context = create_test_context();

    let (tx, rx) = mpsc::channel(1);
    // Drop receiver immediately to simulate channel closed
    drop(rx);

    let result = provider.stream_completion(request(&context), tx).await;

    assert!(matches!(result, Err(ProviderError::ChannelClosed)));
}

#[tokio::test]
async fn test_openrouter_unreachable_server_is_network_error() {
    // Bind then drop a server so the port is closed
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let provider = OpenRouterProvider::new("test-key".to_string(), Some(uri));
    let context = create_test_context();

    let (tx, _rx) = mpsc::channel(100);
    let result = provider.stream_completion(request(&context), tx).await;
    assert!(matches!(result, Err(ProviderError::Network(_))));
}
