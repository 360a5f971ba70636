//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::time::{Duration, Instant};

    use gr8s_prepare::core::{prepare_document, PrepareOptions};
    use gr8s_prepare::verify::{
        cleanup_merge_diffs, cleanup_semantic, compute_changes, diff_main, normalize,
        pretty_print_diff, source_text, target_text, ChangeStats, Diff, Operation, ReportStyle,
        CONTEXT_WIDTH,
    };

    use crate::common::SPA_INDEX;

    #[test]
    fn prepared_document_diff_rebuilds_both_sides() {
        let prepared = prepare_document(SPA_INDEX, &PrepareOptions::default()).unwrap();

        assert_eq!(source_text(&prepared.changes), normalize(SPA_INDEX));
        assert_eq!(target_text(&prepared.changes), normalize(&prepared.html));
    }

    #[test]
    fn prepared_document_keeps_most_of_the_original() {
        let prepared = prepare_document(SPA_INDEX, &PrepareOptions::default()).unwrap();
        let stats = ChangeStats::from_diffs(&prepared.changes);

        assert!(stats.inserted > 0);
        assert!(stats.deleted > 0);
        assert!(stats.retained_ratio() > 0.5);
    }

    #[test]
    fn report_shows_the_title_change() {
        let prepared = prepare_document(SPA_INDEX, &PrepareOptions::default()).unwrap();
        let report = pretty_print_diff(&prepared.changes, ReportStyle::Plain, CONTEXT_WIDTH);

        assert!(report.contains("page_title"));
        assert!(report.contains("{+"));
        assert!(report.contains("[-"));
        assert!(report.ends_with('\n'));
    }

    #[test]
    fn identical_documents_have_no_changes() {
        let diffs = compute_changes(SPA_INDEX, SPA_INDEX, Duration::from_secs(1));

        assert_eq!(diffs, vec![Diff::equal(normalize(SPA_INDEX))]);
        assert_eq!(pretty_print_diff(&diffs, ReportStyle::Plain, CONTEXT_WIDTH), "");
    }

    #[test]
    fn empty_inputs() {
        assert!(diff_main("", "", None).is_empty());
        assert_eq!(diff_main("", "abc", None), vec![Diff::insert("abc")]);
        assert_eq!(diff_main("abc", "", None), vec![Diff::delete("abc")]);
    }

    #[test]
    fn expired_deadline_still_rebuilds_both_sides() {
        let text1: String = (0..200).map(|i| format!("line {i} of the first text\n")).collect();
        let text2: String = (0..200).map(|i| format!("line {} of the second one\n", i * 7)).collect();
        let deadline = Instant::now().checked_sub(Duration::from_secs(1));

        let diffs = diff_main(&text1, &text2, deadline);

        assert_eq!(source_text(&diffs), text1);
        assert_eq!(target_text(&diffs), text2);
    }

    #[test]
    fn repetitive_texts_stay_within_the_budget() {
        let original = format!("x{}", "a".repeat(40_000));
        let transformed = format!("{}z", "a".repeat(20_000));

        let started = Instant::now();
        let diffs = compute_changes(&original, &transformed, Duration::from_millis(100));

        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(source_text(&diffs), original);
        assert_eq!(target_text(&diffs), transformed);
    }

    #[test]
    fn semantic_cleanup_reads_better() {
        let mut diffs = diff_main("mouse", "sofas", None);
        cleanup_semantic(&mut diffs);

        assert_eq!(diffs, vec![Diff::delete("mouse"), Diff::insert("sofas")]);
    }

    #[test]
    fn merge_joins_neighbours() {
        let mut diffs = vec![
            Diff::equal("a"),
            Diff::delete("b"),
            Diff::delete("c"),
            Diff::insert("d"),
            Diff::equal("e"),
            Diff::equal("f"),
        ];
        cleanup_merge_diffs(&mut diffs);

        assert_eq!(
            diffs,
            vec![
                Diff::equal("a"),
                Diff::delete("bc"),
                Diff::insert("d"),
                Diff::equal("ef"),
            ]
        );
        assert!(diffs
            .iter()
            .all(|diff| diff.operation != Operation::Equal || !diff.text.is_empty()));
    }
}
