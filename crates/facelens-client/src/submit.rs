//! Grouped submission of reference photos.
//!
//! One `PATCH /FR/person` per person, all fired at once. Each group
//! finalises its own entry in the [`UploadTracker`] as soon as its
//! request settles, whether it succeeded or failed.

use crate::api::{ApiClient, Reply};
use crate::error::ClientError;
use facelens_core::types::PersonUpdate;
use facelens_core::{PersonRecord, UploadGroup, UploadTracker};
use tokio::task::JoinSet;

/// How one group's request ended.
#[derive(Debug)]
pub struct GroupOutcome {
    /// Name the group was submitted under.
    pub name: String,
    pub images: usize,
    pub result: Result<Reply<PersonRecord>, ClientError>,
}

impl GroupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.result, Ok(Reply::Data(_)))
    }
}

/// Submit every group concurrently. Outcomes are returned in group order.
///
/// `on_settled` runs after each group finishes, with the tracker already updated.
pub async fn submit_groups(
    client: &ApiClient,
    groups: Vec<UploadGroup>,
    mut on_settled: impl FnMut(&GroupOutcome, &UploadTracker),
) -> (Vec<GroupOutcome>, UploadTracker) {
    let mut tracker = UploadTracker::new(groups.len());
    let mut outcomes: Vec<Option<GroupOutcome>> = (0..groups.len()).map(|_| None).collect();
    let mut names = Vec::with_capacity(groups.len());
    let mut tasks = JoinSet::new();

    for (idx, group) in groups.into_iter().enumerate() {
        let client = client.clone();
        let name = group.submit_name();
        names.push((name.clone(), group.images.len()));
        tasks.spawn(async move {
            let images = group.images.len();
            let update = PersonUpdate::append(name.clone(), group.images);
            let result = client.update_person(&name, &update).await;
            (
                idx,
                GroupOutcome {
                    name,
                    images,
                    result,
                },
            )
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, outcome)) => {
                tracker.finish(idx);
                match &outcome.result {
                    Ok(Reply::Data(_)) => {
                        tracing::info!(
                            name = %outcome.name,
                            images = outcome.images,
                            "group uploaded"
                        )
                    }
                    Ok(Reply::Status(code)) => {
                        tracing::warn!(name = %outcome.name, status = code, "group rejected")
                    }
                    Err(e) => {
                        tracing::warn!(name = %outcome.name, error = %e, "group upload failed")
                    }
                }
                on_settled(&outcome, &tracker);
                outcomes[idx] = Some(outcome);
            }
            Err(e) => tracing::error!(error = %e, "upload task aborted"),
        }
    }

    // Anything left unset belongs to an aborted task.
    let outcomes: Vec<GroupOutcome> = outcomes
        .into_iter()
        .zip(names)
        .enumerate()
        .map(|(idx, (outcome, (name, images)))| {
            outcome.unwrap_or_else(|| {
                tracker.finish(idx);
                GroupOutcome {
                    name,
                    images,
                    result: Err(ClientError::Task("task aborted".into())),
                }
            })
        })
        .collect();

    (outcomes, tracker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{client_for, serve_once};

    #[tokio::test]
    async fn test_empty_batch() {
        let client = client_for("http://127.0.0.1:9");
        let (outcomes, tracker) = submit_groups(&client, vec![], |_, _| {}).await;
        assert!(outcomes.is_empty());
        assert!(!tracker.is_pending());
    }

    #[tokio::test]
    async fn test_failed_group_still_finalises() {
        let body = r#"{"name": "JOHN DOE", "images": ["a"]}"#;
        let (ok_url, _ok) = serve_once("200 OK", body).await;
        let client = client_for(&ok_url);
        let groups = vec![UploadGroup {
            name: "John Doe".into(),
            images: vec!["a".into(), "b".into(), "c".into()],
        }];
        let mut settled = 0;
        let (outcomes, tracker) = submit_groups(&client, groups, |outcome, tracker| {
            settled += 1;
            assert_eq!(outcome.name, "JOHN DOE");
            assert!(!tracker.is_pending());
        })
        .await;
        assert_eq!(settled, 1);
        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[0].images, 3);

        // nothing listening: transport error, but the group is still finalised
        let dead = client_for("http://127.0.0.1:9");
        let groups = vec![
            UploadGroup {
                name: "John Doe".into(),
                images: vec!["a".into()],
            },
            UploadGroup {
                name: "Jane Roe".into(),
                images: vec!["b".into(), "c".into()],
            },
        ];
        let (outcomes, tracker) = submit_groups(&dead, groups, |_, _| {}).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].name, "JANE ROE");
        assert!(outcomes.iter().all(|o| !o.is_success()));
        assert!(!tracker.is_pending());
        assert_eq!(tracker.finished_count(), 2);
    }
}
