use std::cmp::Ordering;

use rstest::rstest;

use reqrot::version::{Version, compare, parse_version};

#[rstest]
#[case("3.3.0.2", "3.3.0.20")]
#[case("3.3.0.20", "3.3.0.22")]
#[case("3.1.19", "3.2")]
#[case("3.2", "3.2.1")]
#[case("2013-12-31", "2014.12.24")]
#[case("0.9", "0.10")]
#[case("1.0=py37_0", "1.0=py38_0")]
fn older_version_sorts_first(#[case] older: &str, #[case] newer: &str) {
    let older = parse_version(older);
    let newer = parse_version(newer);

    assert!(older < newer);
    assert!(newer > older);
    assert_eq!(compare(&older, &newer), Ordering::Less);
}

#[test]
fn ordering_is_trichotomous() {
    let inputs = [
        "1.0", "1.0.0", "1.0a1", "1.0rc2", "2.0", "2010l", "2013-12-31", "2014.12.24", "1.0=py37_0",
        "1.2.3.4.5.6", "", "  3.1 ",
    ];

    for a in inputs.map(parse_version) {
        for b in inputs.map(parse_version) {
            let holds = [a < b, a == b, b < a];
            assert_eq!(
                holds.iter().filter(|h| **h).count(),
                1,
                "{:?} vs {:?}",
                a.raw(),
                b.raw()
            );
        }
    }
}

#[rstest]
#[case("1.2.  3")]
#[case("1.2.3  ")]
#[case("  1.2.3")]
fn whitespace_is_ignored_in_segments(#[case] input: &str) {
    assert_eq!(parse_version(input).segments(), ["1", "2", "3"]);
}

#[test]
fn trailing_zero_segments_are_equal() {
    assert_eq!(parse_version("1.0"), parse_version("1.0.0"));
}

#[rstest]
#[case("1.0.0a1", true)]
#[case("2.0.0rc1", true)]
#[case("1.0.dev3", true)]
#[case("1.0.0", false)]
#[case("2014.12.24", false)]
fn detects_prereleases(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(parse_version(input).is_prerelease(), expected);
}

#[test]
fn maximum_compares_segments_before_prerelease_status() {
    let latest = ["1.1.0", "2.0.0", "1.10.0", "2.0.0b1"]
        .into_iter()
        .map(Version::from)
        .max()
        .unwrap();

    assert_eq!(latest.to_string(), "2.0.0b1");
}
