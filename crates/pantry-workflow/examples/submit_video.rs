use std::sync::Arc;

use pantry_workflow::prelude::*;
use pantry_workflow::{ChannelNotifier, init_observability};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), WorkflowError> {
    let _ = dotenvy::dotenv();
    init_observability();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| WorkflowError::Validation("usage: submit_video <video-file>".into()))?;

    let (notifier, mut notifications) = ChannelNotifier::channel();
    let workflow = UploadWorkflow::builder()
        .backend(Arc::new(HttpBackend::from_env()?))
        .notifier(Arc::new(notifier))
        .build()?;

    let mut updates = workflow.subscribe();
    let printer = tokio::spawn(async move {
        let mut last_progress = 0;
        while updates.changed().await.is_ok() {
            let session = updates.borrow_and_update().clone();
            if session.is_uploading() && session.upload_progress() != last_progress {
                last_progress = session.upload_progress();
                println!("uploading... {last_progress}%");
            }
            if session.is_generating() {
                println!("generating recipes...");
            }
        }
    });

    workflow.select_file(VideoFile::from_path(&path).await?);
    let result = workflow.submit().await;

    while let Ok(notification) = notifications.try_recv() {
        println!("[{:?}] {}", notification.level, notification.message);
    }

    let session = result?;
    println!("\nDetected ingredients:");
    for ingredient in session.ingredients() {
        println!("  {} - confidence: {}", ingredient.name, ingredient.confidence_label());
    }
    println!("\nSuggested recipes:");
    for recipe in session.recipes() {
        println!("\n{recipe}");
    }

    drop(workflow);
    let _ = printer.await;
    Ok(())
}
