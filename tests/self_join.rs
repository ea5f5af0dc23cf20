use alg2sql::{Attribute, Catalog, Error, Relation};
use regex::Regex;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Collapses runs of whitespace so layouts can be compared.
fn squish(sql: &str) -> String {
    let ws = Regex::new(r"\s+").unwrap();
    ws.replace_all(sql.trim(), " ").into_owned()
}

fn assert_like(actual: Result<String, Error>, expected: &str) {
    assert_eq!(squish(&actual.unwrap()), squish(expected));
}

struct Fixture {
    relation1: Relation,
    relation2: Relation,
}

impl Fixture {
    fn new() -> Fixture {
        init();
        let catalog = Catalog::new().with_table("users", vec!["id", "name"]);
        let relation1 = catalog.table("users").unwrap();
        let relation2 = relation1.alias();
        Fixture {
            relation1,
            relation2,
        }
    }

    fn id1(&self) -> Attribute {
        self.relation1.attribute("id").unwrap()
    }

    fn id2(&self) -> Attribute {
        self.relation2.attribute("id").unwrap()
    }
}

#[test]
fn joining_a_relation_to_itself() {
    let f = Fixture::new();
    let predicate = f.id1().eq(f.id2());
    assert_like(
        alg2sql::to_sql(&f.relation1.join(&f.relation2).on(predicate)),
        "
        SELECT `users`.`id`, `users`.`name`, `users_2`.`id`, `users_2`.`name`
        FROM `users`
          INNER JOIN `users` AS `users_2`
            ON `users`.`id` = `users_2`.`id`
        ",
    );
}

#[test]
fn joining_with_a_selection_on_the_same_relation() {
    let f = Fixture::new();
    let predicate = f.id1().eq(f.id2());
    let selected = f.relation2.select(f.id2().eq(1));
    assert_like(
        f.relation1.join(&selected).on(predicate).to_sql(),
        "
        SELECT `users`.`id`, `users`.`name`, `users_2`.`id`, `users_2`.`name`
        FROM `users`
          INNER JOIN `users` AS `users_2`
            ON `users`.`id` = `users_2`.`id` AND `users_2`.`id` = 1
        ",
    );
}

#[test]
fn selection_before_the_alias() {
    let f = Fixture::new();
    let relation2 = f.relation1.select(f.id1().eq(1)).alias();
    let id2 = relation2.attribute("id").unwrap();
    assert_like(
        f.relation1.join(&relation2).on(id2.eq(f.id1())).to_sql(),
        "
        SELECT `users`.`id`, `users`.`name`, `users_2`.`id`, `users_2`.`name`
        FROM `users`
          INNER JOIN `users` AS `users_2`
            ON `users_2`.`id` = `users`.`id` AND `users_2`.`id` = 1
        ",
    );
}

const THREE_WAY: &str = "
    SELECT `users`.`id`, `users`.`name`, `users_2`.`id`, `users_2`.`name`, `users_3`.`id`, `users_3`.`name`
    FROM `users`
      INNER JOIN `users` AS `users_2`
        ON `users`.`id` = `users_2`.`id`
      INNER JOIN `users` AS `users_3`
        ON `users_2`.`id` = `users_3`.`id`
";

#[test]
fn joining_itself_multiple_times_left_associatively() {
    let f = Fixture::new();
    let relation3 = f.relation1.alias();
    let id3 = relation3.attribute("id").unwrap();
    let inner = f.relation2.join(&relation3).on(f.id2().eq(&id3));
    assert_like(
        f.relation1.join(&inner).on(f.id1().eq(f.id2())).to_sql(),
        THREE_WAY,
    );
}

#[test]
fn joining_itself_multiple_times_right_associatively() {
    let f = Fixture::new();
    let relation3 = f.relation1.alias();
    let id3 = relation3.attribute("id").unwrap();
    assert_like(
        f.relation1
            .join(&f.relation2)
            .on(f.id1().eq(f.id2()))
            .join(&relation3)
            .on(f.id2().eq(&id3))
            .to_sql(),
        THREE_WAY,
    );
}

/// Checks that `rel` resolves both attributes to their own, distinct owners.
fn assert_disambiguates(rel: &Relation, a: &Attribute, b: &Attribute) {
    let resolved_a = rel.resolve(a).unwrap();
    let resolved_b = rel.resolve(b).unwrap();
    assert_eq!(&resolved_a, a);
    assert_eq!(&resolved_b, b);
    assert_ne!(resolved_a.owner(), resolved_b.owner());
}

#[test]
fn disambiguates_an_attribute_belonging_to_both_sides() {
    let f = Fixture::new();
    let predicate = f.id1().eq(f.id2());
    let joined = f.relation1.join(&f.relation2).on(predicate);
    assert_disambiguates(&joined, &f.id1(), &f.id2());
}

#[test]
fn disambiguates_when_the_left_relation_is_compound() {
    let f = Fixture::new();
    let predicate = f.id1().eq(f.id2());
    let joined = f
        .relation1
        .select(predicate.clone())
        .select(predicate.clone())
        .join(&f.relation2)
        .on(predicate);
    assert_disambiguates(&joined, &f.id1(), &f.id2());
}

#[test]
fn disambiguates_when_the_right_relation_is_compound() {
    let f = Fixture::new();
    let predicate = f.id1().eq(f.id2());
    let right = f
        .relation2
        .select(predicate.clone())
        .select(predicate.clone())
        .select(predicate.clone());
    let joined = f.relation1.join(&right).on(predicate);
    assert_disambiguates(&joined, &f.id1(), &f.id2());
}

#[test]
fn attribute_lookup_on_a_join_prefers_the_left_side() {
    let f = Fixture::new();
    let joined = f
        .relation1
        .select(f.id1().eq(2))
        .join(&f.relation2)
        .on(f.id1().eq(f.id2()));
    assert_eq!(joined.attribute("id").unwrap(), f.id1());
    assert_eq!(joined.attributes().len(), 4);
}

#[test]
fn independent_builds_compile_identically() {
    let build = || {
        let f = Fixture::new();
        let relation3 = f.relation1.alias();
        let id3 = relation3.attribute("id").unwrap();
        f.relation1
            .join(&f.relation2.select(f.id2().gt(7)))
            .on(f.id1().eq(f.id2()))
            .join(&relation3)
            .on(f.id2().eq(&id3))
            .to_sql()
            .unwrap()
    };
    assert_eq!(build(), build());
}

#[test]
fn compiles_from_several_threads() {
    let f = Fixture::new();
    let joined = f.relation1.join(&f.relation2).on(f.id1().eq(f.id2()));
    let expected = joined.to_sql().unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let joined = joined.clone();
            std::thread::spawn(move || joined.to_sql().unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn attribute_of_an_unrelated_table() {
    let f = Fixture::new();
    let stranger = Relation::table("users", vec!["id", "name"]);
    let predicate = f.id1().eq(stranger.attribute("id").unwrap());
    assert_eq!(
        f.relation1.join(&f.relation2).on(predicate).to_sql(),
        Err(Error::UnknownAttribute("id".to_string()))
    );
}

#[test]
fn join_condition_into_a_compound_right_relation() {
    let f = Fixture::new();
    let relation3 = f.relation1.alias();
    let id3 = relation3.attribute("id").unwrap();
    let inner = f.relation2.join(&relation3).on(f.id2().eq(&id3));
    assert_like(
        f.relation1.join(&inner).on(f.id1().eq(&id3)).to_sql(),
        "
        SELECT `users`.`id`, `users`.`name`, `users_2`.`id`, `users_2`.`name`, `users_3`.`id`, `users_3`.`name`
        FROM `users`
          INNER JOIN `users` AS `users_2`
            ON TRUE
          INNER JOIN `users` AS `users_3`
            ON `users_2`.`id` = `users_3`.`id` AND `users`.`id` = `users_3`.`id`
        ",
    );
}

#[test]
fn selection_into_a_compound_right_relation() {
    let f = Fixture::new();
    let relation3 = f.relation1.alias();
    let id3 = relation3.attribute("id").unwrap();
    let inner = f
        .relation2
        .join(&relation3)
        .on(f.id2().eq(&id3))
        .select(id3.eq(f.id1()));
    assert_like(
        f.relation1.join(&inner).on(f.id1().eq(f.id2())).to_sql(),
        "
        SELECT `users`.`id`, `users`.`name`, `users_2`.`id`, `users_2`.`name`, `users_3`.`id`, `users_3`.`name`
        FROM `users`
          INNER JOIN `users` AS `users_2`
            ON `users`.`id` = `users_2`.`id`
          INNER JOIN `users` AS `users_3`
            ON `users_2`.`id` = `users_3`.`id` AND `users_3`.`id` = `users`.`id`
        ",
    );
}

#[test]
fn outer_join_of_a_compound_relation_is_rejected() {
    let f = Fixture::new();
    let relation3 = f.relation1.alias();
    let id3 = relation3.attribute("id").unwrap();
    let inner = f.relation2.join(&relation3).on(f.id2().eq(&id3));
    assert!(matches!(
        f.relation1.outer_join(&inner).on(f.id1().eq(f.id2())).to_sql(),
        Err(Error::MalformedTree(..))
    ));
}

#[test]
fn outer_join_of_an_alias_is_allowed() {
    let f = Fixture::new();
    assert_like(
        f.relation1
            .outer_join(&f.relation2)
            .on(f.id1().eq(f.id2()))
            .to_sql(),
        "
        SELECT `users`.`id`, `users`.`name`, `users_2`.`id`, `users_2`.`name`
        FROM `users`
          LEFT OUTER JOIN `users` AS `users_2`
            ON `users`.`id` = `users_2`.`id`
        ",
    );
}

#[test]
fn joining_the_same_relation_without_an_alias_is_rejected() {
    let f = Fixture::new();
    assert!(matches!(
        f.relation1.join(&f.relation1).on(f.id1().eq(f.id1())).to_sql(),
        Err(Error::MalformedTree(..))
    ));
    assert!(matches!(
        f.relation2.join(&f.relation2).on(f.id2().eq(f.id2())).to_sql(),
        Err(Error::MalformedTree(..))
    ));
}
