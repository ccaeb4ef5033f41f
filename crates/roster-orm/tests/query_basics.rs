//! Exploratory suite for the query builder over a live database session:
//! predicate composition, sorting, pagination, aggregation, joins,
//! fetch-join observability, subqueries, case expressions, and projections.

mod common;

use roster_orm::schema::{members, teams};
use roster_orm::{
    Join, Member, MemberDto, MemberRepository, Select, Session, UserDto,
};
use roster_query::{case, constant, count_all, subquery, Column};
use sqlx::Row;

#[tokio::test]
async fn search_with_composed_predicate() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let select = MemberRepository::select_members()
        .filter(members::username().eq("member1").and(members::age().between(10, 20)));
    let found = MemberRepository::fetch_one_member(&mut session, &select)
        .await
        .unwrap();

    assert_eq!(found.username.as_deref(), Some("member1"));
}

#[tokio::test]
async fn multiple_where_arguments_are_anded() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let select = MemberRepository::select_members()
        .filter(members::username().eq("member1"))
        .filter(members::age().eq(10));
    let found = MemberRepository::fetch_one_member(&mut session, &select)
        .await
        .unwrap();

    assert_eq!(found.username.as_deref(), Some("member1"));
    assert_eq!(found.age, 10);
}

#[tokio::test]
async fn literal_and_built_queries_agree() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let literal = MemberRepository::find_by_name(&mut session, "member1")
        .await
        .unwrap();
    let built = MemberRepository::fetch_members(
        &mut session,
        &MemberRepository::select_members().filter(members::username().eq("member1")),
    )
    .await
    .unwrap();

    assert_eq!(literal, built);
}

#[tokio::test]
async fn sort_age_desc_then_username_asc_nulls_last() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    for (username, age) in [(None, 100), (Some("member3"), 100), (Some("member4"), 100)] {
        let mut member = Member::new(username, age);
        MemberRepository::save(&mut session, &mut member).await.unwrap();
    }

    let select = MemberRepository::select_members()
        .filter(members::age().eq(100))
        .order_by(members::age().desc())
        .order_by(members::username().asc().nulls_last());
    let sorted = MemberRepository::fetch_members(&mut session, &select)
        .await
        .unwrap();

    assert_eq!(
        common::usernames(&sorted),
        vec![
            Some(String::from("member3")),
            Some(String::from("member4")),
            None
        ]
    );
}

#[tokio::test]
async fn paging_returns_remaining_rows_when_fewer_than_limit() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    // Two rows total: offset 1 leaves a single row for a limit of 2.
    let select = MemberRepository::select_members()
        .order_by(members::username().desc())
        .offset(1)
        .limit(2);
    let page = MemberRepository::fetch_members(&mut session, &select)
        .await
        .unwrap();

    assert_eq!(common::usernames(&page), vec![Some(String::from("member1"))]);
}

#[tokio::test]
async fn paging_over_four_rows() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed_four(&mut session).await;

    let select = MemberRepository::select_members()
        .order_by(members::username().desc())
        .offset(1)
        .limit(2);
    let page = MemberRepository::fetch_members(&mut session, &select)
        .await
        .unwrap();

    assert_eq!(
        common::usernames(&page),
        vec![Some(String::from("member3")), Some(String::from("member2"))]
    );
}

#[tokio::test]
async fn aggregation_over_all_members() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let select = Select::from(members::TABLE)
        .project(count_all())
        .project(members::age().sum())
        .project(members::age().avg())
        .project(members::age().max())
        .project(members::age().min());
    let (count, sum, avg, max, min) = session
        .fetch_one_as::<(i64, i64, f64, i64, i64)>(&select)
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(sum, 30);
    assert!((avg - 15.0).abs() < f64::EPSILON);
    assert_eq!(max, 20);
    assert_eq!(min, 10);
}

#[tokio::test]
async fn group_by_team_with_having() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let select = Select::from(members::TABLE)
        .project(teams::name())
        .project(members::age().avg())
        .join(Join::inner(teams::TABLE).on(MemberRepository::team_join()))
        .group_by(teams::name())
        .having(teams::name().eq("teamA"));
    let groups = session.fetch_as::<(String, f64)>(&select).await.unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].0, "teamA");
    assert!((groups[0].1 - 10.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn inner_join_restricted_by_team_name() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let select = MemberRepository::select_members()
        .join(Join::inner(teams::TABLE).on(MemberRepository::team_join()))
        .filter(teams::name().eq("teamA"));
    let team_a = MemberRepository::fetch_members(&mut session, &select)
        .await
        .unwrap();

    assert_eq!(common::usernames(&team_a), vec![Some(String::from("member1"))]);
}

#[tokio::test]
async fn left_join_with_extra_on_predicate_keeps_all_members() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    // Join only teamA; members stay regardless.
    let select = Select::from(members::TABLE)
        .project(members::username())
        .project_as(teams::name(), "team_name")
        .join(
            Join::left(teams::TABLE)
                .on(MemberRepository::team_join().and(teams::name().eq("teamA"))),
        )
        .order_by(members::username().asc());
    let rows = session
        .fetch_as::<(Option<String>, Option<String>)>(&select)
        .await
        .unwrap();

    assert_eq!(
        rows,
        vec![
            (Some(String::from("member1")), Some(String::from("teamA"))),
            (Some(String::from("member2")), None),
        ]
    );
}

#[tokio::test]
async fn left_join_on_no_relation() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    for name in ["teamA", "teamB", "teamC"] {
        let mut member = Member::named(name);
        MemberRepository::save(&mut session, &mut member).await.unwrap();
    }

    // Ad-hoc equality join: member username against team name.
    let select = Select::from(members::TABLE)
        .project(members::username())
        .project_as(teams::name(), "team_name")
        .join(Join::left(teams::TABLE).on(members::username().eq_col(teams::name())))
        .order_by(members::username().asc());
    let rows = session
        .fetch_as::<(Option<String>, Option<String>)>(&select)
        .await
        .unwrap();

    assert_eq!(
        rows,
        vec![
            (Some(String::from("member1")), None),
            (Some(String::from("member2")), None),
            (Some(String::from("teamA")), Some(String::from("teamA"))),
            (Some(String::from("teamB")), Some(String::from("teamB"))),
            (Some(String::from("teamC")), None),
        ]
    );
}

#[tokio::test]
async fn plain_join_leaves_team_unmaterialized() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;
    session.clear();

    let select = MemberRepository::select_members()
        .join(Join::inner(teams::TABLE).on(MemberRepository::team_join()))
        .filter(members::username().eq("member1"));
    let found = MemberRepository::fetch_one_member(&mut session, &select)
        .await
        .unwrap();

    assert!(!found.team.is_loaded());
    // The foreign key is still present without the association.
    assert!(found.team_id.is_some());
}

#[tokio::test]
async fn fetch_join_materializes_team() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;
    session.clear();

    let select = MemberRepository::select_members_with_team()
        .filter(members::username().eq("member1"));
    let found = MemberRepository::fetch_one_member(&mut session, &select)
        .await
        .unwrap();

    assert!(found.team.is_loaded());
    let team = found.team.get().expect("team present");
    assert_eq!(team.name, "teamA");
    assert_eq!(team.id, found.team_id);
}

#[tokio::test]
async fn subquery_in_predicate_position_finds_oldest() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let max_age = Select::from_as(members::TABLE, "m2")
        .project(Column::qualified("m2", "age").max());
    let select = MemberRepository::select_members()
        .filter(members::age().eq_expr(subquery(max_age)));
    let oldest = MemberRepository::fetch_members(&mut session, &select)
        .await
        .unwrap();

    assert_eq!(common::usernames(&oldest), vec![Some(String::from("member2"))]);
    assert_eq!(oldest[0].age, 20);
}

#[tokio::test]
async fn correlated_subquery_in_select_position() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed_four(&mut session).await;

    let teammates = Select::from_as(members::TABLE, "m2")
        .project(count_all())
        .filter(Column::qualified("m2", "team_id").eq_col(members::team_id()));
    let select = Select::from(members::TABLE)
        .project(members::username())
        .project_as(subquery(teammates), "teammates")
        .order_by(members::username().asc());
    let rows = session
        .fetch_as::<(Option<String>, i64)>(&select)
        .await
        .unwrap();

    assert_eq!(
        rows,
        vec![
            (Some(String::from("member1")), 1),
            (Some(String::from("member2")), 3),
            (Some(String::from("member3")), 3),
            (Some(String::from("member4")), 3),
        ]
    );
}

#[tokio::test]
async fn case_expression_with_default_branch() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let select = Select::from(members::TABLE)
        .project(
            case()
                .when(members::age().between(0, 10))
                .then("0-10")
                .otherwise("other"),
        )
        .order_by(members::username().asc());
    let labels = session.fetch_as::<(String,)>(&select).await.unwrap();

    assert_eq!(
        labels,
        vec![(String::from("0-10"),), (String::from("other"),)]
    );
}

#[tokio::test]
async fn constant_in_select_position() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let select = Select::from(members::TABLE)
        .project(members::username())
        .project(constant("A"))
        .order_by(members::username().asc());
    let rows = session
        .fetch_as::<(Option<String>, String)>(&select)
        .await
        .unwrap();

    assert_eq!(
        rows,
        vec![
            (Some(String::from("member1")), String::from("A")),
            (Some(String::from("member2")), String::from("A")),
        ]
    );
}

#[tokio::test]
async fn concat_with_numeric_to_string_conversion() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let select = Select::from(members::TABLE)
        .project(
            members::username()
                .concat(constant("_"))
                .concat(members::age().as_text()),
        )
        .filter(members::username().eq("member1"));
    let rows = session.fetch_as::<(String,)>(&select).await.unwrap();

    assert_eq!(rows, vec![(String::from("member1_10"),)]);
}

#[tokio::test]
async fn simple_and_tuple_projections() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let names = session
        .fetch_as::<(Option<String>,)>(
            &Select::from(members::TABLE)
                .project(members::username())
                .order_by(members::username().asc()),
        )
        .await
        .unwrap();
    assert_eq!(names.len(), 2);
    assert_eq!(names[0].0.as_deref(), Some("member1"));

    let pairs = session
        .fetch_as::<(Option<String>, i64)>(
            &Select::from(members::TABLE)
                .project(members::username())
                .project(members::age())
                .order_by(members::username().asc()),
        )
        .await
        .unwrap();
    assert_eq!(pairs[0], (Some(String::from("member1")), 10));
    assert_eq!(pairs[1], (Some(String::from("member2")), 20));
}

#[tokio::test]
async fn dto_projection_three_ways_agree() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let select = Select::from(members::TABLE)
        .project(members::username())
        .project(members::age())
        .order_by(members::username().asc());

    // Field-name binding via derived FromRow.
    let by_fields = session.fetch_as::<MemberDto>(&select).await.unwrap();

    // Property-setter analogue: explicit per-column reads.
    let by_setters: Vec<MemberDto> = session
        .fetch_rows(&select)
        .await
        .unwrap()
        .iter()
        .map(|row| {
            let mut dto = MemberDto::default();
            dto.username = row.try_get("username").unwrap();
            dto.age = row.try_get("age").unwrap();
            dto
        })
        .collect();

    // Constructor over a tuple row.
    let by_constructor: Vec<MemberDto> = session
        .fetch_as::<(Option<String>, i64)>(&select)
        .await
        .unwrap()
        .into_iter()
        .map(|(username, age)| MemberDto::new(username, age))
        .collect();

    assert_eq!(by_fields.len(), 2);
    assert_eq!(by_fields, by_setters);
    assert_eq!(by_fields, by_constructor);
    assert_eq!(by_fields[0], MemberDto::new(Some(String::from("member1")), 10));
}

#[tokio::test]
async fn projection_into_differently_named_field_requires_alias() {
    let pool = common::pool().await;
    let mut session = Session::begin(&pool).await.unwrap();
    common::seed(&mut session).await;

    let select = Select::from(members::TABLE)
        .project_as(members::username(), "name")
        .project(members::age())
        .order_by(members::username().asc());
    let users = session.fetch_as::<UserDto>(&select).await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name.as_deref(), Some("member1"));
    assert_eq!(users[0].age, 10);
}
