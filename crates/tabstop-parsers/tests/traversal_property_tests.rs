/// Property-based tests for the enter/exit tree walker
/// **Property: every entered node is exited exactly once, after its descendants**

use proptest::prelude::*;
use tabstop_parsers::{Language, Node, NodeVisitor, ParserPool, TreeWalker, VisitAction};

struct Balance {
    open: Vec<usize>,
    entered: usize,
    exited: usize,
    violations: usize,
    last_start: usize,
}

impl<'t> NodeVisitor<'t> for Balance {
    fn enter(&mut self, node: Node<'t>) -> VisitAction {
        if node.start_byte() < self.last_start {
            self.violations += 1;
        }
        self.last_start = node.start_byte();
        self.entered += 1;
        self.open.push(node.id());
        VisitAction::Continue
    }

    fn exit(&mut self, node: Node<'t>) {
        self.exited += 1;
        if self.open.pop() != Some(node.id()) {
            self.violations += 1;
        }
    }
}

/// Strategy for loosely Python-shaped source, frequently malformed
fn python_source_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("x".to_string()),
            Just("foo(".to_string()),
            Just(")".to_string()),
            Just("[1, 2".to_string()),
            Just("]".to_string()),
            Just(" = ".to_string()),
            Just("\n".to_string()),
            Just("def f(a):\n    ".to_string()),
            Just("'abc".to_string()),
            Just(", ".to_string()),
        ],
        0..20,
    )
    .prop_map(|parts| parts.concat())
}

fn language_strategy() -> impl Strategy<Value = Language> {
    prop_oneof![
        Just(Language::Go),
        Just(Language::JavaScript),
        Just(Language::Python),
    ]
}

proptest! {
    /// Property: enter and exit calls pair up like brackets
    #[test]
    fn prop_enter_exit_balanced(src in python_source_strategy(), language in language_strategy()) {
        let pool = ParserPool::new(language);
        let tree = pool.parse(&src).unwrap();
        let mut visitor = Balance {
            open: Vec::new(),
            entered: 0,
            exited: 0,
            violations: 0,
            last_start: 0,
        };

        prop_assert!(TreeWalker::walk(tree.root_node(), &mut visitor));
        prop_assert_eq!(visitor.entered, visitor.exited);
        prop_assert_eq!(visitor.violations, 0);
        prop_assert!(visitor.open.is_empty());
    }
}
