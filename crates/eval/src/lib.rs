//! Palisade permission evaluator -- resolves rules and attribute paths
//! against a principal/entity context and dispatches guard verdicts.
//!
//! The pipeline: a permission spec (rule names and/or inline expression
//! strings) is parsed once into a [`GuardSpec`]. At call time the
//! [`Guard`] resolves the protected entity through an [`EntityFetcher`],
//! builds a fresh [`EvalContext`], evaluates each check through the
//! expression engine (consulting the process-wide rule [`registry`]),
//! and either allows -- optionally injecting the fetched entity into the
//! caller's arguments -- or denies with a structured [`Denial`].
//!
//! Evaluation is synchronous; the only possibly-blocking step is the
//! entity fetch, which belongs entirely to the collaborator.

pub mod entity;
pub mod evaluator;
pub mod guard;
pub mod registry;
pub mod trace;
pub mod values;

#[cfg(test)]
pub(crate) mod testutil;

pub use entity::{Entity, EntityFetcher, EntityId, EntityRef, FetchError, StaticFetcher};
pub use evaluator::{evaluate, EvalContext, EvalError};
pub use guard::{Args, Check, Combinator, Denial, EntityLookup, Guard, GuardError, GuardSpec};
pub use registry::Rule;
pub use trace::{RecordingSink, TraceRecord, TraceSink, TracingSink};
pub use values::Value;

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::testutil::entity;
    use std::sync::Arc;

    /// End-to-end: rule `is_author`, entity fetched by pk, principal is
    /// the post's author -- allowed, and the post is injected.
    #[test]
    fn author_is_allowed_and_entity_is_injected() {
        registry::register("e2e_is_author", |user, obj| {
            obj.and_then(|o| o.field("author"))
                .map(|author| author == Value::Entity(user.clone()))
                .unwrap_or(false)
        });

        let author = entity("User", "42", &[]);
        let post = entity(
            "Post",
            "7",
            &[
                ("pk", Value::Int(7)),
                ("author", Value::Entity(author.clone())),
            ],
        );
        let fetcher = Arc::new(StaticFetcher::new(vec![post.clone()]));

        let spec = GuardSpec::single("e2e_is_author")
            .unwrap()
            .with_lookup(EntityLookup::new("Post"))
            .inject_as("post");
        let guard = Guard::new(spec).with_fetcher(fetcher);

        let mut args = Args::new();
        args.insert("pk".to_owned(), Value::Int(7));
        guard.check(&author, &mut args).unwrap();

        match args.get("post") {
            Some(Value::Entity(injected)) => assert_eq!(injected.ident(), post.ident()),
            other => panic!("expected injected post, got {:?}", other),
        }
    }

    /// End-to-end: draft post, principal is not the author -- the
    /// published-or-author expression denies.
    #[test]
    fn draft_post_denies_non_author() {
        let author = entity("User", "1", &[]);
        let post = entity(
            "Post",
            "3",
            &[
                ("pk", Value::Int(3)),
                ("status", Value::from("draft")),
                ("author", Value::Entity(author)),
            ],
        );
        let fetcher = Arc::new(StaticFetcher::new(vec![post]));

        let spec =
            GuardSpec::single(r#"obj.status == "published" or obj.author == user"#)
                .unwrap()
                .with_lookup(EntityLookup::new("Post"));
        let guard = Guard::new(spec).with_fetcher(fetcher);

        let stranger = entity("User", "2", &[]);
        let mut args = Args::new();
        args.insert("pk".to_owned(), Value::Int(3));
        let err = guard.check(&stranger, &mut args).unwrap_err();
        match err {
            GuardError::Denied(denial) => {
                assert_eq!(denial.principal, EntityId::new("User", 2));
                assert_eq!(denial.entity, Some(EntityId::new("Post", 3)));
            }
            other => panic!("expected denial, got {:?}", other),
        }
    }

    /// The same expression allows once the post is published.
    #[test]
    fn published_post_allows_anyone() {
        let author = entity("User", "1", &[]);
        let post = entity(
            "Post",
            "4",
            &[
                ("pk", Value::Int(4)),
                ("status", Value::from("published")),
                ("author", Value::Entity(author)),
            ],
        );
        let fetcher = Arc::new(StaticFetcher::new(vec![post]));

        let spec =
            GuardSpec::single(r#"obj.status == "published" or obj.author == user"#)
                .unwrap()
                .with_lookup(EntityLookup::new("Post"));
        let guard = Guard::new(spec).with_fetcher(fetcher);

        let stranger = entity("User", "2", &[]);
        let mut args = Args::new();
        args.insert("pk".to_owned(), Value::Int(4));
        assert!(guard.check(&stranger, &mut args).is_ok());
    }
}
