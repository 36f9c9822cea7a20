use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sourcing_pipeline::{intake, Orchestrator};
use sourcing_protocol::{AggregationConfig, Decision, Requisition};
use std::collections::HashMap;

fn req(unspsc: &str, description: &str, qty: f64, price: f64, date: &str, loc: &str) -> Requisition {
    Requisition::new(unspsc, description, qty, price, date, loc)
}

#[test]
fn laptop_batch_flows_through_every_stage() {
    let batch = vec![
        req("43211500", "laptop 15-inch", 10.0, 2000.0, "2024-03-01", "Austin"),
        req("43211500", "laptop 15in", 5.0, 2000.0, "2024-03-10", "Denver"),
        req("44121600", "laptop 15-inch", 1.0, 50.0, "2024-03-02", "Austin"),
    ];

    let output = Orchestrator::default()
        .run(batch, AggregationConfig::default())
        .into_output(true);

    assert!(output.errors.is_empty(), "{:?}", output.errors);
    let ids: Vec<&str> = output.clusters.iter().map(|c| c.cluster_id.as_str()).collect();
    assert_eq!(ids, vec!["0_0", "1_0"]);

    let laptops = &output.clusters[0];
    assert_eq!(laptops.total_value, 30_000.0);
    assert_eq!(laptops.item_count, 2);
    assert_eq!(laptops.locations, vec!["Austin", "Denver"]);

    assert_eq!(output.recommendations.len(), 2);
    assert_eq!(output.recommendations[0].decision, Decision::Consolidate);
    assert_eq!(output.recommendations[0].potential_savings, Some(4500.0));
    assert_eq!(output.recommendations[1].decision, Decision::ProcessIndividually);

    assert_eq!(output.sourcing_events.len(), 1);
    let event = &output.sourcing_events[0];
    assert_eq!(event.cluster_id, "0_0");
    assert_eq!(event.required_dates.start, "2024-03-01");
    assert_eq!(event.required_dates.end, "2024-03-24");
    assert_eq!(event.total_quantity, 15);

    let rows = output.rows.unwrap();
    assert_eq!(rows[2].final_cluster, "1_0");
}

#[test]
fn nothing_to_consolidate_still_yields_recommendations() {
    let batch = vec![req("43211500", "laptop", 1.0, 100.0, "2024-03-01", "Austin")];

    let output = Orchestrator::default()
        .run(batch, AggregationConfig::default())
        .into_output(false);

    assert!(output.errors.is_empty());
    assert_eq!(output.recommendations.len(), 1);
    assert!(output.sourcing_events.is_empty());
}

#[test]
fn invalid_code_stops_the_run_with_one_error() {
    let batch = vec![
        req("43211500", "laptop", 1.0, 100.0, "2024-03-01", "Austin"),
        req("4321-1500", "laptop", 1.0, 100.0, "2024-03-01", "Austin"),
    ];

    let output = Orchestrator::default()
        .run(batch, AggregationConfig::default())
        .into_output(false);

    assert!(output.clusters.is_empty());
    assert!(output.recommendations.is_empty());
    assert!(output.sourcing_events.is_empty());
    assert_eq!(output.errors, vec!["Analysis error: Invalid UNSPSC format: 4321-1500"]);
}

#[test]
fn intake_feeds_the_pipeline() {
    let raw = r#"[
        {"unspsc": 43211500, "description": "office chair ergonomic", "quantity": 40,
         "unit_price": 350, "required_date": "03/01/2024", "delivery_location": "Austin"},
        {"unspsc": "43211500", "description": "ergonomic office chair", "quantity": 40,
         "unit_price": 350, "required_date": "2024-03-05", "delivery_location": "Austin"}
    ]"#;
    let batch = intake::parse_requisitions(raw).unwrap();

    let output = Orchestrator::default()
        .run(batch, AggregationConfig::default())
        .into_output(false);

    assert!(output.errors.is_empty());
    assert_eq!(output.clusters.len(), 1);
    assert_eq!(output.clusters[0].earliest_delivery, "2024-03-01");
    assert_eq!(output.clusters[0].locations, vec!["Austin"]);
    assert_eq!(output.sourcing_events.len(), 1);
}

const WORDS: [&str; 6] = ["laptop", "monitor", "chair", "desk", "toner", "cable"];
const CODES: [&str; 4] = ["43211500", "43211507", "44121600", "4412160"];
const LOCATIONS: [&str; 3] = ["Austin", "Denver", "Boston"];

fn arb_requisition() -> impl Strategy<Value = Requisition> {
    (
        prop::sample::select(CODES.to_vec()),
        prop::collection::vec(prop::sample::select(WORDS.to_vec()), 1..4),
        0u32..100,
        0u32..2_000,
        0u64..90,
        prop::sample::select(LOCATIONS.to_vec()),
    )
        .prop_map(|(code, words, qty, price, offset, loc)| {
            let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .checked_add_days(chrono::Days::new(offset))
                .unwrap();
            req(
                code,
                &words.join(" "),
                f64::from(qty),
                f64::from(price),
                &date.format("%Y-%m-%d").to_string(),
                loc,
            )
        })
}

proptest! {
    #[test]
    fn clusters_partition_the_batch(batch in prop::collection::vec(arb_requisition(), 1..12)) {
        let expected_value: f64 = batch.iter().map(Requisition::total_value).sum();
        let output = Orchestrator::default()
            .run(batch.clone(), AggregationConfig::default())
            .into_output(true);

        prop_assert!(output.errors.is_empty(), "{:?}", output.errors);
        let items: usize = output.clusters.iter().map(|c| c.item_count).sum();
        prop_assert_eq!(items, batch.len());

        let value: f64 = output.clusters.iter().map(|c| c.total_value).sum();
        prop_assert!((value - expected_value).abs() <= 1e-6 * expected_value.max(1.0));

        let rows = output.rows.as_deref().unwrap_or_default();
        prop_assert_eq!(rows.len(), batch.len());
        let mut members: HashMap<&str, (f64, usize)> = HashMap::new();
        for row in rows {
            let entry = members.entry(row.final_cluster.as_str()).or_insert((0.0, 0));
            entry.0 += row.quantity * row.unit_price;
            entry.1 += 1;
        }
        prop_assert_eq!(members.len(), output.clusters.len());
        for cluster in &output.clusters {
            let (member_value, member_count) = members[cluster.cluster_id.as_str()];
            prop_assert_eq!(cluster.item_count, member_count);
            prop_assert!(
                (cluster.total_value - member_value).abs() <= 1e-6 * member_value.max(1.0),
                "cluster {} total {} != members {}",
                cluster.cluster_id,
                cluster.total_value,
                member_value
            );
        }

        for cluster in &output.clusters {
            prop_assert!(cluster.earliest_delivery <= cluster.latest_delivery);
        }
        prop_assert_eq!(output.recommendations.len(), output.clusters.len());

        let consolidated = output
            .recommendations
            .iter()
            .filter(|rec| rec.decision == Decision::Consolidate)
            .count();
        prop_assert_eq!(output.sourcing_events.len(), consolidated);
    }

    #[test]
    fn runs_are_deterministic(batch in prop::collection::vec(arb_requisition(), 1..10)) {
        let orchestrator = Orchestrator::default();
        let first = orchestrator.run(batch.clone(), AggregationConfig::default()).into_output(true);
        let second = orchestrator.run(batch, AggregationConfig::default()).into_output(true);

        prop_assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn one_bad_code_poisons_the_batch(
        mut batch in prop::collection::vec(arb_requisition(), 1..8),
        position in any::<prop::sample::Index>(),
    ) {
        let idx = position.index(batch.len());
        batch[idx].unspsc = "123456789".to_string();

        let output = Orchestrator::default()
            .run(batch, AggregationConfig::default())
            .into_output(false);

        prop_assert!(output.clusters.is_empty());
        prop_assert_eq!(output.errors.len(), 1);
        prop_assert!(output.errors[0].starts_with("Analysis error: Invalid UNSPSC format"));
    }
}
