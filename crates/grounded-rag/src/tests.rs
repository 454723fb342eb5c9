//! Snapshot tests for RAG components

#[cfg(test)]
mod snapshot_tests {
    use crate::test_support::HashEmbeddings;
    use crate::{
        Document, DocumentIndexer, GenerateStage, InMemoryVectorStore, IndexingConfig,
        LocalDocumentIndexer, PipelineState, RecursiveCharacterTextSplitter, SearchConfig,
        VectorStore, rag_prompt,
    };
    use insta::{assert_snapshot, assert_yaml_snapshot};
    use std::sync::Arc;

    fn store() -> Arc<InMemoryVectorStore> {
        Arc::new(InMemoryVectorStore::new(Arc::new(HashEmbeddings::default())))
    }

    #[test]
    fn test_split_documents_snapshot() {
        let splitter = RecursiveCharacterTextSplitter::new(10, 4).unwrap();
        let chunks = splitter
            .split_documents(&[Document::new("aaa bbb ccc ddd eee", "words.txt")])
            .unwrap();

        assert_yaml_snapshot!(chunks, @r###"
        ---
        - content: aaa bbb
          metadata:
            source: words.txt
            start_index: 0
        - content: bbb ccc
          metadata:
            source: words.txt
            start_index: 4
        - content: ccc ddd
          metadata:
            source: words.txt
            start_index: 8
        - content: ddd eee
          metadata:
            source: words.txt
            start_index: 12
        "###);
    }

    #[tokio::test]
    async fn test_vector_store_search_snapshot() {
        let store = store();
        store
            .add(Document::new("best match", "a.txt"), vec![1.0, 0.0])
            .await
            .unwrap();
        store
            .add(Document::new("partial match", "b.txt"), vec![0.6, 0.8])
            .await
            .unwrap();
        store
            .add(Document::new("unrelated", "c.txt"), vec![0.0, 1.0])
            .await
            .unwrap();

        let config = SearchConfig {
            top_k: 2,
            score_threshold: None,
        };
        let result = store.search_by_vector(&[1.0, 0.0], &config).await.unwrap();

        assert_yaml_snapshot!(result, {
            ".documents[].id" => "[id]",
            ".documents[].score" => insta::rounded_redaction(2),
        }, @r###"
        ---
        documents:
          - id: "[id]"
            document:
              content: best match
              metadata:
                source: a.txt
            score: 1
          - id: "[id]"
            document:
              content: partial match
              metadata:
                source: b.txt
            score: 0.6
        total: 2
        "###);
    }

    #[tokio::test]
    async fn test_indexer_stats_snapshot() {
        let config = IndexingConfig {
            chunk_size: 10,
            chunk_overlap: 4,
            batch_size: 2,
        };
        let indexer = LocalDocumentIndexer::with_config(store(), config).unwrap();
        indexer
            .index_documents(vec![
                Document::new("aaa bbb ccc ddd eee", "words.txt"),
                Document::new("tiny", "tiny.txt"),
            ])
            .await
            .unwrap();

        let stats = indexer.stats().await.unwrap();

        assert_yaml_snapshot!(stats, @r###"
        ---
        batch_size: 2
        chunk_overlap: 4
        chunk_size: 10
        indexer_type: local
        stored_documents: 5
        total_chunks: 5
        "###);
    }

    #[test]
    fn test_rendered_rag_prompt_snapshot() {
        let llm = Arc::new(crate::test_support::RecordingLLM::new("unused"));
        let generate = GenerateStage::new(llm, rag_prompt());

        let mut state = PipelineState::new("Which tool does the post cover?");
        state.context = vec![
            Document::new("The post covers PyRIT.", "https://example.com"),
            Document::new("PyRIT automates red teaming.", "notes.txt"),
        ];

        let prompt = generate.render_prompt(&state).unwrap();

        assert_snapshot!(prompt.to_prompt_string(), @r###"
        Human: You are an assistant for question-answering tasks. Use the following pieces of retrieved context to answer the question. If you don't know the answer, just say that you don't know. Use three sentences maximum and keep the answer concise.
        Question: Which tool does the post cover?
        Context: The post covers PyRIT.

        PyRIT automates red teaming.
        Answer:
        "###);
    }
}
