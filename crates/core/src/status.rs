use crate::models::{JobConclusion, JobOutcome, Verdict};

/// Collapse job outcomes into the verdict for the whole run.
///
/// Any cancelled job outranks any failed job, regardless of order. Everything
/// else, including an empty run, is a success.
pub fn reduce(jobs: &[JobOutcome]) -> Verdict {
    if jobs.iter().any(|job| job.has_status(&JobConclusion::Cancelled)) {
        Verdict::Cancelled
    } else if jobs.iter().any(|job| job.has_status(&JobConclusion::Failure)) {
        Verdict::Failure
    } else {
        Verdict::Success
    }
}

#[cfg(test)]
mod tests {
    use super::reduce;
    use crate::models::{JobConclusion, JobOutcome, Verdict};

    fn jobs(statuses: &[Option<&str>]) -> Vec<JobOutcome> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| JobOutcome {
                name: format!("job-{i}"),
                status: status.map(|s| s.parse::<JobConclusion>().unwrap()),
                url: format!("https://example.com/{i}"),
            })
            .collect()
    }

    #[test]
    fn test_reduce() {
        let cases: &[(&[Option<&str>], Verdict)] = &[
            (&[], Verdict::Success),
            (&[Some("success")], Verdict::Success),
            (&[Some("skipped"), Some("neutral"), Some("success")], Verdict::Success),
            (&[None, Some("success")], Verdict::Success),
            (&[Some("timed_out")], Verdict::Success),
            (&[Some("failure")], Verdict::Failure),
            (&[Some("success"), Some("failure"), Some("success")], Verdict::Failure),
            (&[Some("cancelled")], Verdict::Cancelled),
            (&[Some("failure"), Some("failure"), Some("cancelled")], Verdict::Cancelled),
            (&[Some("cancelled"), Some("failure")], Verdict::Cancelled),
        ];
        for &(statuses, expected) in cases {
            assert_eq!(reduce(&jobs(statuses)), expected, "statuses: {statuses:?}");
        }
    }

    #[test]
    fn test_reduce_ignores_order() {
        let mut outcomes = jobs(&[Some("failure"), Some("success"), Some("cancelled"), None]);
        let expected = reduce(&outcomes);
        for _ in 0..outcomes.len() {
            outcomes.rotate_left(1);
            assert_eq!(reduce(&outcomes), expected);
            outcomes.reverse();
            assert_eq!(reduce(&outcomes), expected);
        }
        assert_eq!(expected, Verdict::Cancelled);
    }
}
