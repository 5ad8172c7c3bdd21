// ABOUTME: Property tests for the validated domain types.
// ABOUTME: Checkout name ordering, directory name parsing and name validation.

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use wharf::types::{BranchName, CheckoutName, CommitId, RepoName};

fn timestamp() -> impl Strategy<Value = chrono::DateTime<Utc>> {
    (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, mo, d, h, mi, s)| {
            let naive = NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap();
            Utc.from_utc_datetime(&naive)
        },
    )
}

proptest! {
    #[test]
    fn checkout_names_sort_like_their_timestamps(a in timestamp(), b in timestamp()) {
        let (na, nb) = (CheckoutName::at(&a), CheckoutName::at(&b));
        prop_assert_eq!(na.cmp(&nb), a.cmp(&b));
    }

    #[test]
    fn dir_names_parse_back(time in timestamp(), commit in "[0-9a-f]{40}") {
        let name = CheckoutName::at(&time);
        let commit = CommitId::new(&commit).unwrap();
        let (parsed, prefix) = CheckoutName::parse_dir_name(&name.dir_name(&commit)).unwrap();
        prop_assert_eq!(parsed, name);
        prop_assert!(commit.as_str().starts_with(prefix.as_str()));
        prop_assert_eq!(prefix.as_str().len(), 11);
    }

    #[test]
    fn names_with_separators_are_rejected(prefix in "[a-z]{1,10}", suffix in "[a-z]{1,10}") {
        let value = format!("{prefix}/{suffix}");
        prop_assert!(RepoName::new(&value).is_err());
        prop_assert!(BranchName::new(&value).is_err());
    }

    #[test]
    fn plain_names_are_accepted(value in "[a-zA-Z0-9][a-zA-Z0-9._-]{0,40}") {
        let name = RepoName::new(&value).unwrap();
        prop_assert_eq!(name.as_str(), value.as_str());
    }
}

#[test]
fn ssh_arguments_lose_their_quotes() {
    assert_eq!(RepoName::from_ssh_arg("'shop'").unwrap().as_str(), "shop");
    assert_eq!(RepoName::from_ssh_arg("shop").unwrap().as_str(), "shop");
}
