//! Row-scope enforcement across every query path.

use std::io::Write;
use std::sync::Arc;

use myvote::config::StoreConfig;
use myvote::{
    create_store, Caller, ExecutionOutcome, Filter, QueryDescriptor, Role, RowStore, ScalarValue,
    ScopedExecutor, Table,
};
use tempfile::NamedTempFile;

const SEED: &str = r#"{
    "panchayats": [{"id": 1, "name": "Kadampanad"}],
    "wards": [
        {"id": 10, "name": "Mannadi", "ward_no": 1, "panchayat_id": 1},
        {"id": 20, "name": "Thuvayoor", "ward_no": 2, "panchayat_id": 1},
        {"id": 30, "name": "Empty", "ward_no": 3, "panchayat_id": 1}
    ],
    "booths": [
        {"id": 100, "name": "LP School", "booth_no": 1, "ward_id": 10},
        {"id": 101, "name": "UP School", "booth_no": 2, "ward_id": 10},
        {"id": 200, "name": "High School", "booth_no": 3, "ward_id": 20}
    ],
    "candidates": [
        {"id": 1, "name": "Anil", "party": "A", "ward_id": 10},
        {"id": 2, "name": "Bindu", "party": "B", "ward_id": 20}
    ],
    "voters": [
        {"id": 1, "sl_no": 1, "name": "Suresh", "gender": "Male", "age": 44, "booth_id": 100},
        {"id": 2, "sl_no": 2, "name": "Lakshmi", "gender": "Female", "age": 61, "booth_id": 101},
        {"id": 3, "sl_no": 3, "name": "Jithu", "gender": "Male", "age": 23, "booth_id": 200},
        {"id": 4, "sl_no": 4, "name": "Gokul", "gender": "Male", "age": 35, "booth_id": 200}
    ]
}"#;

fn seeded_store() -> (NamedTempFile, Arc<dyn RowStore>) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SEED.as_bytes()).unwrap();
    let config = StoreConfig {
        data_file: Some(file.path().to_string_lossy().to_string()),
        ..Default::default()
    };
    let store = create_store(&config).unwrap();
    (file, store)
}

async fn member(store: &Arc<dyn RowStore>, ward: i64) -> Caller {
    Caller::resolve(store.as_ref(), Role::WardMember, Some(ScalarValue::from(ward)))
        .await
        .unwrap()
}

fn rows(outcome: ExecutionOutcome) -> Vec<myvote::Row> {
    match outcome {
        ExecutionOutcome::Rows(rows) => rows,
        other => panic!("expected rows, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ward_without_booths_never_sees_voters() {
    let (_file, store) = seeded_store();
    let executor = ScopedExecutor::with_limits(store.clone(), 5, 100);
    let caller = member(&store, 30).await;

    assert_eq!(caller, Caller::ward_member(30_i64, vec![]));

    let outcome = executor
        .execute(&caller, &QueryDescriptor::list(Table::Voters).with_limit(100))
        .await
        .unwrap();
    assert!(rows(outcome).is_empty());

    let outcome = executor
        .execute(&caller, &QueryDescriptor::count(Table::Voters))
        .await
        .unwrap();
    assert_eq!(outcome, ExecutionOutcome::Count(0));

    assert_eq!(executor.total_voters(&caller).await.unwrap(), 0);
}

#[tokio::test]
async fn test_ward_member_sees_only_own_ward() {
    let (_file, store) = seeded_store();
    let executor = ScopedExecutor::with_limits(store.clone(), 5, 100);
    let caller = member(&store, 10).await;

    let voters = rows(
        executor
            .execute(&caller, &QueryDescriptor::list(Table::Voters))
            .await
            .unwrap(),
    );
    let names: Vec<_> = voters.iter().map(|v| v["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Suresh", "Lakshmi"]);

    // A filter naming another ward's booth still cannot escape the scope
    let outcome = executor
        .execute(
            &caller,
            &QueryDescriptor::count(Table::Voters).with_filter(Filter::eq("booth_id", 200_i64)),
        )
        .await
        .unwrap();
    assert_eq!(outcome, ExecutionOutcome::Count(0));

    let candidates = rows(
        executor
            .execute(&caller, &QueryDescriptor::list(Table::Candidates))
            .await
            .unwrap(),
    );
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["name"], "Anil");

    let wards = rows(
        executor
            .execute(&caller, &QueryDescriptor::list(Table::Wards))
            .await
            .unwrap(),
    );
    assert_eq!(wards.len(), 1);
    assert_eq!(wards[0]["name"], "Mannadi");
    assert_eq!(wards[0]["panchayats"]["name"], "Kadampanad");

    let booths = executor
        .list_rows(&caller, Table::Booths, &[], None, None)
        .await
        .unwrap();
    assert_eq!(booths.len(), 2);

    let panchayats = executor
        .list_rows(&caller, Table::Panchayats, &[], None, None)
        .await
        .unwrap();
    assert_eq!(panchayats.len(), 1);
}

#[tokio::test]
async fn test_admin_sees_everything() {
    let (_file, store) = seeded_store();
    let executor = ScopedExecutor::with_limits(store.clone(), 5, 100);

    assert_eq!(executor.total_voters(&Caller::Admin).await.unwrap(), 4);

    let outcome = executor
        .execute(
            &Caller::Admin,
            &QueryDescriptor::count(Table::Voters).with_filter(Filter::eq("gender", "Male")),
        )
        .await
        .unwrap();
    assert_eq!(outcome, ExecutionOutcome::Count(3));
}

#[tokio::test]
async fn test_list_results_carry_booth_and_ward() {
    let (_file, store) = seeded_store();
    let executor = ScopedExecutor::with_limits(store, 5, 100);

    let voters = rows(
        executor
            .execute(
                &Caller::Admin,
                &QueryDescriptor::list(Table::Voters).with_filter(Filter::ilike("name", "jith")),
            )
            .await
            .unwrap(),
    );
    assert_eq!(voters.len(), 1);
    assert_eq!(voters[0]["booths"]["name"], "High School");
    assert_eq!(voters[0]["booths"]["wards"]["name"], "Thuvayoor");
    assert_eq!(voters[0]["booths"]["wards"]["panchayats"]["name"], "Kadampanad");
}
