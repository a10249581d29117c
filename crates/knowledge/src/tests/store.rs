//! End-to-end behaviour of `KnowledgeBase`.

use crate::{document_id, KnowledgeBase, StoreOptions};
use tempfile::TempDir;

const BUDGET_DOC: &str = "An independent film budget separates above-the-line costs such as \
    cast and director fees from below-the-line costs such as crew, equipment and locations. \
    Contingency is usually set aside in the budget.";

const COLOR_DOC: &str = "Color grading in post-production adjusts contrast, saturation and hue \
    after picture lock. Colorists work from a reference monitor.";

const CASTING_DOC: &str = "Casting directors organize auditions, callbacks and chemistry reads \
    before the shoot begins.";

fn store() -> KnowledgeBase {
    KnowledgeBase::open_in_memory(StoreOptions::default()).unwrap()
}

#[tokio::test]
async fn test_add_document_defaults_tags_and_chunks() {
    let kb = KnowledgeBase::open_in_memory(StoreOptions::default().with_chunk_words(10)).unwrap();
    let doc = kb
        .add_document("Film Budget Basics", BUDGET_DOC, "pre-production", vec![])
        .await
        .unwrap();

    assert_eq!(doc.id, document_id("Film Budget Basics", BUDGET_DOC));
    assert_eq!(doc.tags, vec!["pre-production"]);

    let stats = kb.stats().unwrap();
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.chunks as usize, BUDGET_DOC.split_whitespace().count().div_ceil(10));
}

#[tokio::test]
async fn test_readding_same_document_is_idempotent() {
    let kb = store();
    kb.add_document("Color", COLOR_DOC, "post-production", vec![])
        .await
        .unwrap();
    kb.add_document("Color", COLOR_DOC, "post-production", vec![])
        .await
        .unwrap();

    let stats = kb.stats().unwrap();
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.chunks, 1);
}

#[tokio::test]
async fn test_empty_title_rejected() {
    let kb = store();
    assert!(kb.add_document("  ", COLOR_DOC, "production", vec![]).await.is_err());
}

#[tokio::test]
async fn test_search_documents_ranks_by_vocabulary() {
    let kb = store();
    kb.add_document("Film Budget Basics", BUDGET_DOC, "pre-production", vec![])
        .await
        .unwrap();
    kb.add_document("Color Grading", COLOR_DOC, "post-production", vec![])
        .await
        .unwrap();
    kb.add_document("Casting", CASTING_DOC, "pre-production", vec![])
        .await
        .unwrap();

    let matches = kb
        .search_documents("independent film budget contingency", 2)
        .await
        .unwrap();

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].document.title, "Film Budget Basics");
    assert!(matches[0].distance <= matches[1].distance);
}

#[tokio::test]
async fn test_search_documents_deduplicates_parents() {
    let kb = KnowledgeBase::open_in_memory(StoreOptions::default().with_chunk_words(5)).unwrap();
    kb.add_document("Film Budget Basics", BUDGET_DOC, "pre-production", vec![])
        .await
        .unwrap();
    kb.add_document("Color Grading", COLOR_DOC, "post-production", vec![])
        .await
        .unwrap();

    let matches = kb.search_documents("budget costs", 5).await.unwrap();
    assert_eq!(matches.len(), 2);
    assert_ne!(matches[0].document.id, matches[1].document.id);
}

#[tokio::test]
async fn test_delete_document_removes_from_search() {
    let kb = store();
    let doc = kb
        .add_document("Color Grading", COLOR_DOC, "post-production", vec![])
        .await
        .unwrap();

    assert!(kb.delete_document(&doc.id).unwrap());
    assert!(kb.get_document(&doc.id).unwrap().is_none());
    assert!(kb.search_documents("color grading", 3).await.unwrap().is_empty());
    assert_eq!(kb.stats().unwrap().chunks, 0);
}

#[tokio::test]
async fn test_load_directory_infers_title_and_category() {
    let temp = TempDir::new().unwrap();
    let kb_dir = temp.path().join("knowledge_base");
    std::fs::create_dir_all(kb_dir.join("post-production")).unwrap();
    std::fs::create_dir_all(kb_dir.join("pre-production")).unwrap();
    std::fs::write(kb_dir.join("post-production/color_grading.txt"), COLOR_DOC).unwrap();
    std::fs::write(kb_dir.join("pre-production/casting_process.md"), CASTING_DOC).unwrap();
    std::fs::write(kb_dir.join("general_notes.txt"), BUDGET_DOC).unwrap();
    std::fs::write(kb_dir.join("poster.png"), [0u8, 1, 2]).unwrap();

    let kb = KnowledgeBase::open(&temp.path().join(".reel/index.sqlite"), StoreOptions::default())
        .unwrap();
    let stats = kb.load_directory(&kb_dir).await.unwrap();
    assert_eq!(stats.documents_loaded, 3);

    let post = kb.list_documents(Some("post-production")).unwrap();
    assert_eq!(post.len(), 1);
    assert_eq!(post[0].title, "Color Grading");

    let pre = kb.list_documents(Some("pre-production")).unwrap();
    assert_eq!(pre[0].title, "Casting Process");

    let production = kb.list_documents(Some("production")).unwrap();
    assert_eq!(production[0].title, "General Notes");

    assert!(kb.stats().unwrap().db_size_bytes > 0);
}

#[tokio::test]
async fn test_load_missing_directory_fails() {
    let kb = store();
    let temp = TempDir::new().unwrap();
    assert!(kb.load_directory(&temp.path().join("nope")).await.is_err());
}

#[test]
fn test_unknown_embedding_provider_is_rejected() {
    let mut options = StoreOptions::default();
    options.embedding_provider = "neural".to_string();
    let result = KnowledgeBase::open_in_memory(options);
    assert!(matches!(result, Err(reel_core::AppError::Knowledge(_))));
}

#[tokio::test]
async fn test_failed_chunk_write_leaves_document_untouched() {
    let kb = KnowledgeBase::open_in_memory(StoreOptions::default().with_chunk_words(10)).unwrap();
    let doc = kb
        .add_document("Film Budget Basics", BUDGET_DOC, "pre-production", vec![])
        .await
        .unwrap();
    let before = kb.stats().unwrap();
    assert!(before.chunks > 1);

    kb.conn()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER reject_second_chunk BEFORE INSERT ON chunks
             WHEN NEW.chunk_index = 1
             BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
        )
        .unwrap();

    assert!(kb
        .add_document("Film Budget Basics", BUDGET_DOC, "pre-production", vec![])
        .await
        .is_err());
    let after = kb.stats().unwrap();
    assert_eq!(after.chunks, before.chunks);
    assert_eq!(after.documents, 1);
    assert!(kb.get_document(&doc.id).unwrap().is_some());

    assert!(kb
        .add_document("Casting Process", CASTING_DOC, "pre-production", vec![])
        .await
        .is_err());
    assert!(kb
        .get_document(&document_id("Casting Process", CASTING_DOC))
        .unwrap()
        .is_none());
    assert_eq!(kb.stats().unwrap().chunks, before.chunks);
}
