//! Guard pipeline exercised through the public API only, with domain
//! types implementing the collaborator traits the way an application
//! would.

use std::sync::Arc;

use palisade_eval::{
    registry, Args, Entity, EntityFetcher, EntityId, EntityLookup, EntityRef, FetchError, Guard,
    GuardError, GuardSpec, RecordingSink, Value,
};

#[derive(Clone)]
struct User {
    id: i64,
    is_staff: bool,
}

impl Entity for User {
    fn ident(&self) -> EntityId {
        EntityId::new("User", self.id)
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Int(self.id)),
            "is_staff" => Some(Value::Bool(self.is_staff)),
            _ => None,
        }
    }
}

#[derive(Clone)]
struct Article {
    id: i64,
    status: &'static str,
    author: Arc<User>,
}

impl Entity for Article {
    fn ident(&self) -> EntityId {
        EntityId::new("Article", self.id)
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "pk" => Some(Value::Int(self.id)),
            "status" => Some(Value::Str(self.status.to_owned())),
            "author" => Some(Value::Entity(self.author.clone())),
            _ => None,
        }
    }
}

struct ArticleStore {
    articles: Vec<Arc<Article>>,
}

impl EntityFetcher for ArticleStore {
    fn fetch(
        &self,
        kind: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<EntityRef>, FetchError> {
        if kind != "Article" {
            return Ok(None);
        }
        Ok(self
            .articles
            .iter()
            .find(|a| a.field(field).as_ref() == Some(value))
            .map(|a| a.clone() as EntityRef))
    }
}

fn fixture() -> (Arc<User>, Arc<User>, Arc<ArticleStore>) {
    let author = Arc::new(User {
        id: 1,
        is_staff: false,
    });
    let staff = Arc::new(User {
        id: 2,
        is_staff: true,
    });
    let store = Arc::new(ArticleStore {
        articles: vec![Arc::new(Article {
            id: 10,
            status: "draft",
            author: author.clone(),
        })],
    });
    (author, staff, store)
}

#[test]
fn author_or_staff_can_edit_draft() {
    registry::register("pipeline_is_author", |user, obj| {
        obj.and_then(|o| o.field("author"))
            .map(|author| author == Value::Entity(user.clone()))
            .unwrap_or(false)
    });

    let (author, staff, store) = fixture();
    let spec = GuardSpec::any(&["pipeline_is_author", "user.is_staff"])
        .unwrap()
        .with_lookup(EntityLookup::new("Article"))
        .inject_as("article");
    let guard = Guard::new(spec).with_fetcher(store);

    // The author passes on the first check.
    let mut args = Args::new();
    args.insert("pk".to_owned(), Value::Int(10));
    guard.check(&(author as EntityRef), &mut args).unwrap();
    assert!(matches!(args.get("article"), Some(Value::Entity(_))));

    // Staff fails the first check but passes the second.
    let mut args = Args::new();
    args.insert("pk".to_owned(), Value::Int(10));
    guard.check(&(staff as EntityRef), &mut args).unwrap();
}

#[test]
fn stranger_is_denied_and_trace_shows_both_checks() {
    registry::register("pipeline_is_author2", |user, obj| {
        obj.and_then(|o| o.field("author"))
            .map(|author| author == Value::Entity(user.clone()))
            .unwrap_or(false)
    });

    let (_, _, store) = fixture();
    let stranger = Arc::new(User {
        id: 3,
        is_staff: false,
    });

    let sink = Arc::new(RecordingSink::new());
    let spec = GuardSpec::any(&["pipeline_is_author2", "user.is_staff"])
        .unwrap()
        .with_lookup(EntityLookup::new("Article"));
    let guard = Guard::new(spec).with_fetcher(store).with_trace(sink.clone());

    let mut args = Args::new();
    args.insert("pk".to_owned(), Value::Int(10));
    let err = guard.check(&(stranger as EntityRef), &mut args).unwrap_err();

    match err {
        GuardError::Denied(denial) => {
            assert_eq!(denial.failed_check, "user.is_staff");
            assert_eq!(denial.entity, Some(EntityId::new("Article", 10)));
        }
        other => panic!("expected denial, got {:?}", other),
    }

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].check, "pipeline_is_author2");
    assert!(!records[0].verdict);
    assert_eq!(records[1].check, "user.is_staff");
    assert!(!records[1].verdict);
    assert_eq!(records[0].entity, Some(EntityId::new("Article", 10)));
}

#[test]
fn missing_article_is_indistinguishable_from_denial() {
    registry::register("pipeline_always", |_, _| true);
    let (author, _, store) = fixture();

    let spec = GuardSpec::single("pipeline_always")
        .unwrap()
        .with_lookup(EntityLookup::new("Article"));
    let guard = Guard::new(spec).with_fetcher(store);

    let mut args = Args::new();
    args.insert("pk".to_owned(), Value::Int(404));
    let err = guard.check(&(author as EntityRef), &mut args).unwrap_err();
    assert!(matches!(err, GuardError::Denied(_)));
}
