//! Hot reload of the provisioning file.

use std::time::Duration;
use conn_context::config::watcher::ConfigWatcher;

mod common;

#[tokio::test]
async fn test_edit_is_delivered_to_receiver() {
    let path = common::write_temp_config(common::PROVISIONING);
    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run().expect("watch provisioning file");

    tokio::time::sleep(Duration::from_millis(200)).await;
    let edited = common::PROVISIONING.replace("apn = \"mms\"", "apn = \"mms.edited\"");
    std::fs::write(&path, edited).unwrap();

    // A single write can raise several events; wait for the edited revision.
    let found = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(config) = updates.recv().await {
            if config.candidates.iter().any(|c| c.apn == "mms.edited") {
                return true;
            }
        }
        false
    })
    .await;
    let _ = std::fs::remove_file(&path);

    assert!(matches!(found, Ok(true)), "edited provisioning not delivered in time");
}
