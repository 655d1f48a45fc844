use mcc_model::RecordCompletenessReport;

const MISSING_HEADER: &str = "Missing values per record";
const RECORDS_HEADER: &str = "Number of records";

/// Plain-text record completeness summary.
pub fn render_record_summary(report: &RecordCompletenessReport) -> String {
    let mut lines = vec![
        "== Record Completeness Summary ==".to_string(),
        format!("Total number of records: {}", report.total_records),
        format!(
            "Number of complete records: {} ({:.2}%)",
            report.complete_records, report.complete_records_percentage
        ),
        format!("{MISSING_HEADER}  {RECORDS_HEADER}"),
    ];
    lines.extend(report.row_missing_distribution.iter().map(|bucket| {
        format!(
            "{:>missing$}  {:>records$}",
            bucket.missing_values,
            bucket.records,
            missing = MISSING_HEADER.len(),
            records = RECORDS_HEADER.len(),
        )
    }));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_model::RowMissingBucket;

    #[test]
    fn renders_distribution() {
        let report = RecordCompletenessReport {
            total_records: 4,
            complete_records: 3,
            complete_records_percentage: 75.0,
            row_missing_distribution: vec![
                RowMissingBucket {
                    missing_values: 0,
                    records: 3,
                },
                RowMissingBucket {
                    missing_values: 2,
                    records: 1,
                },
            ],
            ..RecordCompletenessReport::default()
        };

        insta::assert_snapshot!(render_record_summary(&report), @r"
        == Record Completeness Summary ==
        Total number of records: 4
        Number of complete records: 3 (75.00%)
        Missing values per record  Number of records
                                0                  3
                                2                  1
        ");
    }

    #[test]
    fn renders_empty_dataset() {
        let report = RecordCompletenessReport::default();
        insta::assert_snapshot!(render_record_summary(&report), @r"
        == Record Completeness Summary ==
        Total number of records: 0
        Number of complete records: 0 (0.00%)
        Missing values per record  Number of records
        ");
    }
}
