/// Normalise a list of policy names into an ordered set.
///
/// Names are trimmed, empty names are dropped and duplicates are removed keeping the
/// position of the first occurrence.
pub fn normalise_policies<I, S>(policies: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalised: Vec<String> = Vec::new();
    for policy in policies {
        let policy = policy.as_ref().trim();
        if policy.is_empty() || normalised.iter().any(|known| known == policy) {
            continue;
        }
        normalised.push(policy.to_string());
    }
    normalised
}
