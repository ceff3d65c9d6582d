/// Region buckets derived from node display names. Buckets are disjoint:
/// a name is assigned to the first region whose keyword set matches, in the
/// fixed order Hong Kong, Taiwan, Japan, Singapore, USA.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionBuckets {
    pub hong_kong: Vec<String>,
    pub taiwan: Vec<String>,
    pub japan: Vec<String>,
    pub singapore: Vec<String>,
    pub usa: Vec<String>,
    pub others: Vec<String>,
}

const HONG_KONG: &[&str] = &["hk", "hong", "kong", "港", "香港"];
const TAIWAN: &[&str] = &["tw", "taiwan", "台", "台湾"];
const JAPAN: &[&str] = &["jp", "japan", "日", "日本"];
const SINGAPORE: &[&str] = &["sg", "singapore", "狮城", "新", "新加坡"];
const USA: &[&str] = &["us", "united", "states", "america", "美", "美国"];

fn matches(name_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| name_lower.contains(kw))
}

pub fn classify(names: &[String]) -> RegionBuckets {
    let mut buckets = RegionBuckets::default();
    for name in names {
        let lower = name.to_lowercase();
        let bucket = if matches(&lower, HONG_KONG) {
            &mut buckets.hong_kong
        } else if matches(&lower, TAIWAN) {
            &mut buckets.taiwan
        } else if matches(&lower, JAPAN) {
            &mut buckets.japan
        } else if matches(&lower, SINGAPORE) {
            &mut buckets.singapore
        } else if matches(&lower, USA) {
            &mut buckets.usa
        } else {
            &mut buckets.others
        };
        bucket.push(name.clone());
    }
    buckets
}

/// Renders a group membership list at the indentation the config template
/// expects. An empty bucket becomes a single `DIRECT` entry; a selectable
/// group must never be rendered empty.
pub fn render_members(names: &[String]) -> String {
    if names.is_empty() {
        return "      - DIRECT".to_string();
    }
    names
        .iter()
        .map(|n| format!("      - \"{n}\""))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn assigns_each_region_by_keyword() {
        let buckets = classify(&names(&[
            "HK-01",
            "香港 02",
            "Taiwan premium",
            "JP Tokyo",
            "新加坡-1",
            "US west",
            "Frankfurt",
        ]));
        assert_eq!(buckets.hong_kong, names(&["HK-01", "香港 02"]));
        assert_eq!(buckets.taiwan, names(&["Taiwan premium"]));
        assert_eq!(buckets.japan, names(&["JP Tokyo"]));
        assert_eq!(buckets.singapore, names(&["新加坡-1"]));
        assert_eq!(buckets.usa, names(&["US west"]));
        assert_eq!(buckets.others, names(&["Frankfurt"]));
    }

    #[test]
    fn first_matching_region_wins() {
        // Matches both Hong Kong ("hk") and Japan ("jp"); Hong Kong is
        // checked first.
        let buckets = classify(&names(&["HK-JP relay"]));
        assert_eq!(buckets.hong_kong.len(), 1);
        assert!(buckets.japan.is_empty());
    }

    #[test]
    fn classification_is_a_partition() {
        let input = names(&["HK", "TW", "JP", "SG", "US", "other-1", "other-2"]);
        let buckets = classify(&input);
        let mut all: Vec<String> = Vec::new();
        all.extend(buckets.hong_kong.clone());
        all.extend(buckets.taiwan.clone());
        all.extend(buckets.japan.clone());
        all.extend(buckets.singapore.clone());
        all.extend(buckets.usa.clone());
        all.extend(buckets.others.clone());
        let mut sorted = all.clone();
        sorted.sort();
        let mut expected = input.clone();
        expected.sort();
        assert_eq!(sorted, expected);
        assert_eq!(all.len(), input.len());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let buckets = classify(&names(&["hong kong lite", "SINGAPORE"]));
        assert_eq!(buckets.hong_kong.len(), 1);
        assert_eq!(buckets.singapore.len(), 1);
    }

    #[test]
    fn empty_bucket_renders_direct_placeholder() {
        assert_eq!(render_members(&[]), "      - DIRECT");
    }

    #[test]
    fn members_render_quoted_at_fixed_indent() {
        let rendered = render_members(&names(&["a", "b"]));
        assert_eq!(rendered, "      - \"a\"\n      - \"b\"");
    }
}
