//! Integration tests for md2tex document conversion

use md2tex::{
    markdown_to_latex, markdown_to_latex_with_options, markdown_to_latex_with_report, CodeStyle,
    M2LOptions, MarkdownConverter, WarningKind,
};

// ============================================================================
// Headings
// ============================================================================

mod headings {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_double_marker_is_section_without_title() {
        let result = markdown_to_latex("## A\n");
        assert_eq!(result, "\\section{A}\n");
    }

    #[test]
    fn test_single_marker_is_section_when_present() {
        let result = markdown_to_latex("# Top\n## Sub\n");
        assert_eq!(result, "\\section{Top}\n\\subsection{Sub}\n");
    }

    #[test]
    fn test_title_present_drops_title_line() {
        let result = markdown_to_latex_with_options("# Title\n## A\n", &M2LOptions::with_title());
        assert_eq!(result, "\\section{A}\n");
    }

    #[test]
    fn test_heading_inside_code_untouched() {
        let result = markdown_to_latex("```bash\n# comment\n```\n");
        assert!(result.contains("\n# comment\n"));
    }
}

// ============================================================================
// Tables
// ============================================================================

mod tables {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_two_column_alignment() {
        let input = "| a | b |\n|:--|--:|\n| 1 | 2 |\n";
        let result = markdown_to_latex(input);
        assert!(result.contains("\\begin{tabular}{lr}"));
        assert!(result.contains("\\textbf{a} & \\textbf{b} \\\\"));
        assert!(result.contains("        1 & 2 \\\\"));
    }

    #[test]
    fn test_captioned_table_document() {
        let input = "Results below.\n\n*==tab1_Scores==*\n\n| Name | Score |\n|---|:-:|\n| **Al** | 50% |\n\nSee [#tab1].\n";
        let result = markdown_to_latex(input);
        let expected = "Results below.

\\begin{table}[ht]
    \\centering
    \\caption{Scores}
    \\begin{tabular}{lc}
        \\toprule
        \\textbf{Name} & \\textbf{Score} \\\\
        \\midrule
        \\textbf{Al} & 50\\% \\\\
        \\bottomrule
    \\end{tabular}
    \\label{tab1}
\\end{table}

See \\ref{tab1}.
";
        assert_eq!(result, expected);
    }

    #[test]
    fn test_table_placement_option() {
        let options = M2LOptions {
            table_placement: "H".to_string(),
            ..M2LOptions::default()
        };
        let result = markdown_to_latex_with_options("| a |\n|---|\n| 1 |\n", &options);
        assert!(result.starts_with("\\begin{table}[H]\n"));
    }
}

// ============================================================================
// Equations
// ============================================================================

mod equations {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_math_block() {
        let result = markdown_to_latex("$$\na * b * c\n$$\n");
        assert_eq!(result, "\\begin{equation}\n    a * b * c\n\\end{equation}\n");
    }

    #[test]
    fn test_labelled_align() {
        let input = "*==eq1==*\n\n$$\n\\begin{align}\nx &= 1 \\\\\ny &= 2\n\\end{align}\n$$\n";
        let result = markdown_to_latex(input);
        assert_eq!(
            result,
            "\\begin{equation}\n    \\begin{align*}\n    x &= 1 \\\\\n    y &= 2\n    \\end{align*}\n    \\label{eq1}\n\\end{equation}\n"
        );
    }
}

// ============================================================================
// Inline markup
// ============================================================================

mod inline {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_masking_protects_math() {
        let result = markdown_to_latex("Use `code` and $a*b$ and $c*d$.\n");
        assert!(result.contains("$a*b$"));
        assert!(result.contains("$c*d$"));
        assert!(!result.contains("\\textit"));
    }

    #[test]
    fn test_image_with_label_and_caption() {
        let result = markdown_to_latex("![fig1](x.png \"cap\")\n");
        assert_eq!(
            result,
            "\\begin{figure}[ht]\n    \\centering\n    \\includegraphics[width=\\textwidth]{x.png}\n    \\caption{cap}\n    \\label{fig1}\n\\end{figure}\n"
        );
    }

    #[test]
    fn test_bare_image() {
        let result = markdown_to_latex("![](x.png)\n");
        assert!(!result.contains("\\caption"));
        assert!(!result.contains("\\label"));
    }

    #[test]
    fn test_figure_placement_option() {
        let options = M2LOptions {
            figure_placement: "H".to_string(),
            ..M2LOptions::default()
        };
        let result = markdown_to_latex_with_options("![a](b.png)\n", &options);
        assert!(result.starts_with("\\begin{figure}[H]"));
    }

    #[test]
    fn test_listing_inline_code() {
        let result = markdown_to_latex_with_options("run `ls -a`\n", &M2LOptions::listings());
        assert_eq!(result, "run \\lstinline|ls -a|\n");
    }

    #[test]
    fn test_mixed_line() {
        let result = markdown_to_latex(
            "**Note**: see [docs](https://example.com) and [@knuth84], 10% done\n",
        );
        assert_eq!(
            result,
            "\\textbf{Note}: see \\href{https://example.com}{docs} and \\cite{knuth84}, 10\\% done\n"
        );
    }
}

// ============================================================================
// HTML
// ============================================================================

mod html {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unsupported_tag_is_stripped_with_warning() {
        let result =
            markdown_to_latex_with_report("before <div>inside</div> after\n", &M2LOptions::default());
        assert_eq!(result.output, "before inside after\n");
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::UnsupportedHtmlTag);
    }

    #[test]
    fn test_img_tag_figure() {
        let result = markdown_to_latex(
            "<img src=\"./figure/bird.png\" alt=\"fig1\" title=\"Latex Bird\" style=\"zoom:50%;\" />\n",
        );
        assert!(result.contains("\\includegraphics[width=0.5\\textwidth]{./figure/bird.png}"));
        assert!(result.contains("\\caption{Latex Bird}"));
        assert!(result.contains("\\label{fig1}"));
    }

    #[test]
    fn test_angle_brackets_in_prose_survive() {
        let result =
            markdown_to_latex_with_report("if x<y and y>z then done\n", &M2LOptions::default());
        assert_eq!(result.output, "if x<y and y>z then done\n");
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_img_without_src_warns() {
        let result = markdown_to_latex_with_report("<img alt=\"x\">\n", &M2LOptions::default());
        assert_eq!(result.warnings[0].kind, WarningKind::MissingImageSource);
    }
}

// ============================================================================
// Environment stack
// ============================================================================

mod environments {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_balanced_document() {
        let input = "# Title\n\n- a\n- b\n\n1. x\n2. y\n\n```rust\nfn main() {}\n```\n\n$$\nx\n$$\n";
        let result = markdown_to_latex_with_report(input, &M2LOptions::default());
        assert!(result.is_balanced());
        assert!(result.output.contains("\\end{itemize}"));
        assert!(result.output.contains("\\end{enumerate}"));
        assert!(result.output.contains("\\end{minted}"));
    }

    #[test]
    fn test_unclosed_fence_is_reported() {
        let result = markdown_to_latex_with_report("```python\nprint(1)\n", &M2LOptions::default());
        assert!(!result.is_balanced());
        assert!(!result.output.contains("\\end{minted}"));
        assert_eq!(result.warnings[0].kind, WarningKind::UnclosedEnvironment);
    }

    #[test]
    fn test_code_style_listing() {
        let converter = MarkdownConverter::with_options(M2LOptions {
            code_style: CodeStyle::Listing,
            ..M2LOptions::default()
        });
        let result = converter.convert("```c\nint main;\n```\n");
        assert_eq!(
            result.output,
            "\\begin{lstlisting}[language=c]\nint main;\n\\end{lstlisting}\n"
        );
    }

    #[test]
    fn test_table_inside_fence_stays_literal() {
        let input = "```text\n| a |\n|---|\n```\n";
        let result = markdown_to_latex(input);
        assert!(!result.contains("\\begin{table}"));
        assert!(result.contains("\n| a |\n|---|\n"));
    }

    #[test]
    fn test_crlf_table_is_converted() {
        let result = markdown_to_latex_with_report(
            "| a | b |\r\n|:--|--:|\r\n| 1 | 2 |\r\n",
            &M2LOptions::default(),
        );
        assert!(result.output.contains("\\begin{tabular}{lr}"));
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_inline_math_environment_keeps_later_lines_converted() {
        let result = markdown_to_latex_with_report(
            "\\begin{equation} x = 1 \\end{equation}\n**b**\n",
            &M2LOptions::default(),
        );
        assert!(result.is_balanced());
        assert!(result.output.ends_with("\\textbf{b}\n"));
    }

    #[test]
    fn test_inputs_are_not_shared_between_calls() {
        let a = markdown_to_latex("- a\n");
        let b = markdown_to_latex("- a\n");
        assert_eq!(a, b);
    }
}
