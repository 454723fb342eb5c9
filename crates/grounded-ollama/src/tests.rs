//! HTTP and snapshot tests for the Ollama client

#[cfg(test)]
mod snapshot_tests {
    use crate::{
        EmbeddingProvider, Error, GenerationConfig, LLMProvider, OllamaClient, OllamaConfig,
        OllamaEmbeddings, OllamaLLM,
    };
    use insta::assert_yaml_snapshot;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OllamaClient {
        OllamaClient::new(OllamaConfig::new(server.uri()).with_timeout_secs(5)).unwrap()
    }

    #[test]
    fn test_config_snapshot() {
        let config = OllamaConfig::default();

        assert_yaml_snapshot!(config, @r###"
        ---
        host: "http://localhost:11434"
        timeout_secs: 300
        "###);
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_and_reads_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "llama3",
                "prompt": "Human: hello",
                "stream": false,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3",
                "response": "Hi there.",
                "done": true,
                "eval_count": 3,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let llm = OllamaLLM::new(client_for(&server), "llama3");
        let result = llm.generate("Human: hello").await.unwrap();

        assert_eq!(result.text, "Hi there.");
        assert_eq!(result.model_id, "llama3");
        assert_eq!(result.tokens_used, Some(3));
    }

    #[tokio::test]
    async fn test_generate_with_config_passes_options() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "other-model",
                "options": {"temperature": 0.0, "num_predict": 64},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "ok",
                "done": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let llm = OllamaLLM::new(client_for(&server), "llama3");
        let config = GenerationConfig {
            model_id: "other-model".to_string(),
            max_tokens: Some(64),
            temperature: Some(0.0),
            ..Default::default()
        };
        let result = llm.generate_with_config("prompt", &config).await.unwrap();

        assert_eq!(result.text, "ok");
        assert_eq!(result.model_id, "other-model");
        assert_eq!(result.tokens_used, None);
    }

    #[tokio::test]
    async fn test_generate_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let llm = OllamaLLM::new(client_for(&server), "missing");
        let err = llm.generate("prompt").await.unwrap_err();

        match err {
            Error::LLMProvider(msg) => {
                assert!(msg.contains("404"));
                assert!(msg.contains("model not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embed_documents_batch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_json(json!({
                "model": "mxbai-embed-large",
                "input": ["alpha", "beta"],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "mxbai-embed-large",
                "embeddings": [[0.5, 0.25], [0.0, 1.0]],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let embeddings = OllamaEmbeddings::new(client_for(&server), "mxbai-embed-large");
        let vectors = embeddings
            .embed_documents(&["alpha".to_string(), "beta".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![0.5, 0.25], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_embed_query_is_deterministic() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embeddings": [[0.1, 0.2, 0.3]],
            })))
            .expect(2)
            .mount(&server)
            .await;

        let embeddings = OllamaEmbeddings::new(client_for(&server), "mxbai-embed-large");
        let first = embeddings.embed_query("same text").await.unwrap();
        let second = embeddings.embed_query("same text").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn test_embed_count_mismatch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embeddings": [[0.1]],
            })))
            .mount(&server)
            .await;

        let embeddings = OllamaEmbeddings::new(client_for(&server), "mxbai-embed-large");
        let err = embeddings
            .embed_documents(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn test_embed_empty_input_skips_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let embeddings = OllamaEmbeddings::new(client_for(&server), "mxbai-embed-large");
        let vectors = embeddings.embed_documents(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on port 9 on a test host.
        let client = OllamaClient::new(OllamaConfig::new("http://127.0.0.1:9").with_timeout_secs(2)).unwrap();
        let embeddings = OllamaEmbeddings::new(client, "mxbai-embed-large");

        let err = embeddings.embed_query("hello").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "mxbai-embed-large:latest"}, {"name": "llama3:8b"}],
            })))
            .mount(&server)
            .await;

        let models = client_for(&server).list_models().await.unwrap();
        assert_eq!(models, vec!["mxbai-embed-large:latest", "llama3:8b"]);
    }

    #[tokio::test]
    async fn test_generate_uses_instance_defaults() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "llama3",
                "options": {"temperature": 0.5, "top_k": 40, "stop": ["\n\n"]},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "short answer",
                "done": true,
                "eval_count": 3,
            })))
            .expect(1)
            .mount(&server)
            .await;

        // An empty model_id falls back to the model the LLM was built with.
        let llm = OllamaLLM::new(client_for(&server), "llama3").with_defaults(GenerationConfig {
            temperature: Some(0.5),
            top_k: Some(40),
            stop_sequences: vec!["\n\n".to_string()],
            ..Default::default()
        });
        let result = llm.generate("prompt").await.unwrap();

        assert_eq!(result.text, "short answer");
        assert_eq!(result.model_id, "llama3");
        assert_eq!(result.tokens_used, Some(3));
    }

    #[tokio::test]
    async fn test_client_keeps_config() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        assert_eq!(client.config().host, server.uri());
        assert_eq!(client.config().timeout_secs, 5);
        assert_eq!(client.config().endpoint("/api/tags"), format!("{}/api/tags", server.uri()));
    }
}
