#[cfg(test)]
mod rendering_tests {
    use crate::{
        parse_record, Alignment, ListKind, QuotingSink, RenderContext, SharedWriter,
        StructuredOutput, CONSOLE_MARKER,
    };
    use proptest::prelude::*;

    // Calls a command may issue inside a table body
    #[derive(Debug, Clone)]
    enum Call {
        Header,
        Body,
        Field(i64),
        Skip,
        Text(String),
        Spaces(usize),
        List,
        Hint,
    }

    fn call() -> impl Strategy<Value = Call> {
        prop_oneof![
            Just(Call::Header),
            Just(Call::Body),
            any::<i64>().prop_map(Call::Field),
            Just(Call::Skip),
            "[ -~]{0,8}".prop_map(Call::Text),
            (0usize..8).prop_map(Call::Spaces),
            Just(Call::List),
            Just(Call::Hint),
        ]
    }

    fn issue(out: &mut dyn StructuredOutput, call: &Call) {
        // Protocol errors are fine here; only the bytes written matter.
        let _ = match call {
            Call::Header => out.table_header(4, Alignment::Right, "col", "Col"),
            Call::Body => out.table_body(),
            Call::Field(value) => out.field_int(0, 6, Alignment::Left, Some("n"), *value),
            Call::Skip => out.field_skip(1, 6, Alignment::Center, Some("addr")),
            Call::Text(text) => out.text(text),
            Call::Spaces(count) => out.spaces(*count),
            Call::List => out
                .begin_list(ListKind::List, Some("rows"))
                .and_then(|_| out.end_list(ListKind::List)),
            Call::Hint => out.wrap_hint("  "),
        };
    }

    /// Render a small two-column table the way `info breakpoints` would.
    fn breakpoint_table(out: &mut dyn StructuredOutput, rows: &[(i64, &str)]) {
        out.begin_table(2, rows.len(), "BreakpointTable").unwrap();
        out.table_header(3, Alignment::Left, "number", "Num").unwrap();
        out.table_header(14, Alignment::Left, "type", "Type").unwrap();
        out.table_body().unwrap();
        for (number, kind) in rows {
            out.begin_list(ListKind::Tuple, Some("bkpt")).unwrap();
            out.field_int(0, 3, Alignment::Left, Some("number"), *number)
                .unwrap();
            out.field_string(1, 14, Alignment::Left, Some("type"), kind)
                .unwrap();
            out.end_list(ListKind::Tuple).unwrap();
            out.text("\n").unwrap();
        }
        out.end_table().unwrap();
    }

    #[test]
    fn test_scenarios() {
        let mut ctx = RenderContext::new(String::new());
        ctx.field_int(0, 5, Alignment::Right, Some("n"), 42).unwrap();
        assert_eq!(ctx.sink(), "   42 ");

        let mut ctx = RenderContext::new(String::new());
        ctx.field_string(0, 4, Alignment::Center, Some("s"), "ab")
            .unwrap();
        assert_eq!(ctx.sink(), " ab  ");
    }

    #[test]
    fn test_breakpoint_listing() {
        let mut ctx = RenderContext::new(String::new());
        breakpoint_table(&mut ctx, &[(1, "breakpoint"), (2, "hw watchpoint")]);
        assert_eq!(
            ctx.sink(),
            "Num Type           \n1   breakpoint     \n2   hw watchpoint  \n"
        );
    }

    #[test]
    fn test_empty_listing_then_full_listing() {
        let mut ctx = RenderContext::new(String::new());
        breakpoint_table(&mut ctx, &[]);
        assert_eq!(ctx.sink(), "");

        breakpoint_table(&mut ctx, &[(1, "breakpoint")]);
        assert_eq!(ctx.sink(), "Num Type           \n1   breakpoint     \n");
    }

    #[test]
    fn test_quoted_table_round_trips() {
        let shared = SharedWriter::new(Vec::new());
        let mut quoted = RenderContext::new(QuotingSink::new(shared.clone(), CONSOLE_MARKER));
        let mut plain = RenderContext::new(String::new());

        let rows = [(1, "breakpoint"), (2, "say \"hi\"\t")];
        breakpoint_table(&mut quoted, &rows);
        breakpoint_table(&mut plain, &rows);
        quoted.flush().unwrap();

        let written = String::from_utf8(shared.borrow().clone()).unwrap();
        let mut decoded = String::new();
        for line in written.lines() {
            let (marker, text) = parse_record(line).unwrap();
            assert_eq!(marker, "~");
            decoded.push_str(&text);
        }
        assert_eq!(written.lines().count(), 3);
        assert_eq!(&decoded, plain.sink());
    }

    #[test]
    fn test_plain_and_quoted_contexts_are_independent() {
        let shared = SharedWriter::new(Vec::new());
        let mut quoted = RenderContext::new(QuotingSink::new(shared.clone(), CONSOLE_MARKER));
        let mut plain = RenderContext::new(String::new());

        quoted.begin_table(1, 0, "empty").unwrap();
        plain.text("still visible\n").unwrap();
        assert!(quoted.is_suppressed());
        assert!(!plain.is_suppressed());
        quoted.end_table().unwrap();

        assert_eq!(plain.sink(), "still visible\n");
    }

    proptest! {
        #[test]
        fn prop_empty_table_is_silent(calls in prop::collection::vec(call(), 0..24)) {
            let mut ctx = RenderContext::new(String::new());
            ctx.begin_table(1, 0, "empty").unwrap();
            for call in &calls {
                issue(&mut ctx, call);
            }
            ctx.end_table().unwrap();

            prop_assert_eq!(ctx.sink().as_str(), "");
            prop_assert!(!ctx.is_suppressed());
        }

        #[test]
        fn prop_one_line_break_at_body(rows in 1usize..50, labels in prop::collection::vec("[a-z]{1,6}", 1..5)) {
            let mut ctx = RenderContext::new(String::new());
            ctx.begin_table(labels.len(), rows, "t").unwrap();
            for label in &labels {
                ctx.table_header(8, Alignment::Left, label, label).unwrap();
            }
            prop_assert!(!ctx.sink().contains('\n'));
            ctx.table_body().unwrap();
            prop_assert!(ctx.sink().ends_with('\n'));
            prop_assert_eq!(ctx.sink().matches('\n').count(), 1);
        }

        #[test]
        fn prop_message_follows_threshold(threshold in 0u32..5, level in 0u32..5, suppressed in any::<bool>()) {
            let mut ctx = RenderContext::new(String::new()).with_verbosity(threshold);
            if suppressed {
                ctx.begin_table(1, 0, "empty").unwrap();
            }
            ctx.message(level, format_args!("msg")).unwrap();
            prop_assert_eq!(!ctx.sink().is_empty(), threshold >= level);
        }
    }
}
