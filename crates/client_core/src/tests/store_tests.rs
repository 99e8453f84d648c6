use super::*;

fn matter(id: i64, status: MatterStatus) -> Matter {
    Matter::new(MatterId(id), format!("Matter {id}"), status)
}

fn ids(matters: &[Matter]) -> Vec<i64> {
    matters.iter().map(|m| m.id.0).collect()
}

#[test]
fn grouping_partitions_every_matter_exactly_once() {
    let statuses = MatterStatus::ALL;
    let matters: Vec<Matter> = (0..23)
        .map(|i| matter(i, statuses[(i as usize * 7) % statuses.len()]))
        .collect();

    let columns = group_by_status(&matters);

    assert_eq!(columns.keys().copied().collect::<Vec<_>>(), statuses.to_vec());
    let mut seen: Vec<i64> = columns.values().flat_map(|c| ids(c)).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..23).collect::<Vec<_>>());
    for (status, column) in &columns {
        assert!(column.iter().all(|m| m.status == *status));
    }
}

#[test]
fn grouping_keeps_relative_order_within_a_column() {
    let matters = vec![
        matter(5, MatterStatus::Review),
        matter(1, MatterStatus::Collection),
        matter(3, MatterStatus::Review),
        matter(2, MatterStatus::Review),
    ];
    let columns = group_by_status(&matters);
    assert_eq!(ids(&columns[&MatterStatus::Review]), vec![5, 3, 2]);
    assert!(columns[&MatterStatus::Inactive].is_empty());
}

#[test]
fn null_status_from_the_api_groups_under_collection() {
    let matters: Vec<Matter> = serde_json::from_value(serde_json::json!([
        { "id": 1, "name": "no status" },
        { "id": 2, "name": "null status", "status": null },
        { "id": 3, "name": "culling", "status": "CULLING" }
    ]))
    .expect("json");

    let columns = group_by_status(&matters);
    assert_eq!(ids(&columns[&MatterStatus::Collection]), vec![1, 2]);
    assert_eq!(ids(&columns[&MatterStatus::Culling]), vec![3]);
}

#[tokio::test]
async fn set_status_returns_previous_and_is_visible_to_readers() {
    let store = MatterStatusStore::new(vec![
        matter(1, MatterStatus::Collection),
        matter(2, MatterStatus::Culling),
    ]);

    let previous = store
        .set_status(MatterId(2), MatterStatus::Production)
        .await
        .expect("set");
    assert_eq!(previous, MatterStatus::Culling);

    let columns = store.group_by_status().await;
    assert_eq!(ids(&columns[&MatterStatus::Production]), vec![2]);
    assert!(columns[&MatterStatus::Culling].is_empty());
    assert_eq!(ids(&store.all().await), vec![1, 2]);
}

#[tokio::test]
async fn set_status_on_unknown_matter_fails_without_mutation() {
    let store = MatterStatusStore::new(vec![matter(1, MatterStatus::Review)]);
    let err = store
        .set_status(MatterId(9), MatterStatus::Inactive)
        .await
        .expect_err("missing");
    assert_eq!(err, StoreError::MatterNotFound(MatterId(9)));
    assert_eq!(store.status_of(MatterId(1)).await, Some(MatterStatus::Review));
}

#[tokio::test]
async fn position_reports_column_and_index() {
    let store = MatterStatusStore::new(vec![
        matter(1, MatterStatus::Review),
        matter(2, MatterStatus::Collection),
        matter(3, MatterStatus::Review),
    ]);
    assert_eq!(
        store.position_of(MatterId(3)).await,
        Some((MatterStatus::Review, 1))
    );
    assert_eq!(store.position_of(MatterId(4)).await, None);
}

#[tokio::test]
async fn error_banner_can_be_reported_and_dismissed() {
    let store = MatterStatusStore::default();
    assert_eq!(store.last_error().await, None);
    store.report_error("Matter not found").await;
    assert_eq!(store.last_error().await.as_deref(), Some("Matter not found"));
    store.dismiss_error().await;
    assert_eq!(store.last_error().await, None);
}

#[tokio::test]
async fn replace_all_swaps_the_working_set() {
    let store = MatterStatusStore::new(vec![matter(1, MatterStatus::Review)]);
    store
        .replace_all(vec![matter(8, MatterStatus::Inactive)])
        .await;
    assert!(store.get(MatterId(1)).await.is_none());
    assert_eq!(
        store.get(MatterId(8)).await.map(|m| m.status),
        Some(MatterStatus::Inactive)
    );
}
