//! Definition-level contracts consumed by the scheduler.

use chrono_tz::UTC;
use strata_partitions::prelude::*;

fn date_dimension() -> PartitionsDefinition {
    PartitionsDefinition::TimeWindow(
        TimeWindowPartitionsDefinition::daily("2021-05-05", Some("2021-05-10"), UTC)
            .expect("bounded daily definition"),
    )
}

fn abc_dimension() -> PartitionsDefinition {
    PartitionsDefinition::Static(StaticPartitionsDefinition::new(["a", "b", "c"]).expect("static"))
}

fn composite() -> PartitionsDefinition {
    PartitionsDefinition::Multi(
        MultiPartitionsDefinition::new([
            ("date", date_dimension()),
            ("abc", abc_dimension()),
        ])
        .expect("multi definition"),
    )
}

#[test]
fn empty_subset_representation_matches_definition_shape() {
    assert!(matches!(
        abc_dimension().empty_subset(),
        PartitionsSubset::KeySet(_)
    ));
    assert!(matches!(
        date_dimension().empty_subset(),
        PartitionsSubset::TimeWindows(_)
    ));
    assert!(matches!(
        composite().empty_subset(),
        PartitionsSubset::KeySet(_)
    ));
}

#[test]
fn empty_subsets_have_zero_partitions() {
    assert_eq!(abc_dimension().empty_subset().partitions_count(), 0);
    assert_eq!(date_dimension().empty_subset().partitions_count(), 0);
    assert_eq!(composite().empty_subset().partitions_count(), 0);
    assert!(composite().empty_subset().is_empty());
}

#[test]
fn composite_key_space_is_the_product_of_dimensions() {
    let date_count = date_dimension().partitions_count().expect("bounded");
    assert_eq!(date_count, 5);
    assert_eq!(
        composite().partitions_count().expect("bounded"),
        date_count * 3
    );
    assert_eq!(
        composite().partition_keys().expect("bounded").len(),
        date_count * 3
    );
}

#[test]
fn composite_subset_accepts_tuple_keys_and_rejects_bad_arity() {
    let subset = composite()
        .empty_subset()
        .with_partition_keys(["b|2021-05-06"])
        .expect("tuple key");
    assert_eq!(subset.partitions_count(), 1);
    assert!(subset.contains("b|2021-05-06"));

    let err = subset.with_partition_keys(["b"]).expect_err("missing dimension");
    assert!(matches!(err, Error::InvalidPartitionKey { .. }));

    let err = subset
        .with_partition_keys(["b|2021-05-06|extra"])
        .expect_err("too many dimensions");
    assert!(matches!(err, Error::InvalidPartitionKey { .. }));
}

#[test]
fn open_ended_definition_supports_membership_but_not_expansion() {
    let open = PartitionsDefinition::TimeWindow(
        TimeWindowPartitionsDefinition::daily("2023-01-01", None, UTC).expect("daily"),
    );
    assert!(!open.is_bounded());
    assert!(open.has_partition_key("2030-06-15"));
    assert!(matches!(
        open.partition_keys(),
        Err(Error::UnboundedPartitionSpace { .. })
    ));

    // A composite inherits unboundedness from any dimension.
    let multi = PartitionsDefinition::Multi(
        MultiPartitionsDefinition::new([("date", open), ("abc", abc_dimension())])
            .expect("multi definition"),
    );
    assert!(!multi.is_bounded());
    assert!(matches!(
        multi.partition_keys(),
        Err(Error::UnboundedPartitionSpace { .. })
    ));
}

#[test]
fn definition_equality_is_structural() {
    assert_eq!(composite(), composite());
    assert_eq!(date_dimension(), date_dimension());
    assert_ne!(date_dimension(), abc_dimension());
}
