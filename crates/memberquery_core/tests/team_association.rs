use memberquery_core::db::open_db_in_memory;
use memberquery_core::{
    MemberRepository, MemberSearchCondition, MemberService, NewMember, NewTeam, PageRequest,
    PageStrategy, RepoError, SqliteMemberRepository, SqliteTeamRepository, TeamRepository,
};

#[test]
fn saving_member_with_team_appears_in_team_collection() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let team_a = teams.save_team(&NewTeam::new("teamA")).unwrap();
    let member1 = members
        .save_member(&NewMember::with_team("member1", 10, team_a))
        .unwrap();
    let member2 = members
        .save_member(&NewMember::with_team("member2", 20, team_a))
        .unwrap();

    let team = teams.find_team(team_a).unwrap().unwrap();
    assert_eq!(team.name, "teamA");
    assert_eq!(team.members(), &[member1, member2]);
}

#[test]
fn change_team_updates_both_sides() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let team_a = teams.save_team(&NewTeam::new("teamA")).unwrap();
    let team_b = teams.save_team(&NewTeam::new("teamB")).unwrap();
    let member = members
        .save_member(&NewMember::with_team("member1", 10, team_a))
        .unwrap();

    members.change_team(member, Some(team_b)).unwrap();

    assert_eq!(
        members.find_member(member).unwrap().unwrap().team_id(),
        Some(team_b)
    );
    assert!(!teams.find_team(team_a).unwrap().unwrap().has_member(member));
    assert!(teams.find_team(team_b).unwrap().unwrap().has_member(member));

    members.change_team(member, None).unwrap();
    assert_eq!(members.find_member(member).unwrap().unwrap().team_id(), None);
    assert!(teams.find_team(team_b).unwrap().unwrap().members().is_empty());
}

#[test]
fn change_team_failures_leave_association_untouched() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let team_a = teams.save_team(&NewTeam::new("teamA")).unwrap();
    let member = members
        .save_member(&NewMember::with_team("member1", 10, team_a))
        .unwrap();

    let err = members.change_team(member, Some(999)).unwrap_err();
    assert!(matches!(err, RepoError::TeamNotFound(999)));
    assert_eq!(
        members.find_member(member).unwrap().unwrap().team_id(),
        Some(team_a)
    );
    assert!(teams.find_team(team_a).unwrap().unwrap().has_member(member));

    let err = members.change_team(member + 100, Some(team_a)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == member + 100));
}

#[test]
fn find_all_teams_and_by_name_group_members() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let team_a = teams.save_team(&NewTeam::new("teamA")).unwrap();
    let team_b = teams.save_team(&NewTeam::new("teamB")).unwrap();
    let in_b = members
        .save_member(&NewMember::with_team("member1", 10, team_b))
        .unwrap();
    members.save_member(&NewMember::new("loner", 5)).unwrap();

    let all = teams.find_all_teams().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, team_a);
    assert!(all[0].members().is_empty());
    assert_eq!(all[1].members(), &[in_b]);

    let named = teams.find_team_by_name("teamB").unwrap();
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].id, team_b);
    assert!(teams.find_team_by_name("teamC").unwrap().is_empty());
    assert!(teams.find_team(team_b + 10).unwrap().is_none());
}

#[test]
fn service_resolves_team_lazily() {
    let conn = open_db_in_memory().unwrap();
    let service = MemberService::new(
        SqliteMemberRepository::try_new(&conn).unwrap(),
        SqliteTeamRepository::try_new(&conn).unwrap(),
    );

    let team_a = service.create_team("teamA").unwrap();
    let member = service
        .register_member(&NewMember::with_team("member1", 10, team_a))
        .unwrap();
    let solo = service.register_member(&NewMember::named("solo")).unwrap();

    let team = service.team_of(member).unwrap().unwrap();
    assert_eq!(team.id, team_a);
    assert!(team.has_member(member));
    assert!(service.team_of(solo).unwrap().is_none());
    assert!(matches!(
        service.team_of(solo + 50),
        Err(RepoError::NotFound(_))
    ));

    service.change_team(solo, Some(team_a)).unwrap();
    assert_eq!(service.team_of(solo).unwrap().unwrap().members().len(), 2);
}

#[test]
fn seeded_roster_alternates_teams() {
    let conn = open_db_in_memory().unwrap();
    let service = MemberService::new(
        SqliteMemberRepository::try_new(&conn).unwrap(),
        SqliteTeamRepository::try_new(&conn).unwrap(),
    );

    let summary = service.seed_sample_roster(100).unwrap();
    assert_eq!(summary.members.len(), 100);

    let member0 = service.find_member(summary.members[0]).unwrap().unwrap();
    assert_eq!(member0.username, "member0");
    assert_eq!(member0.age, 0);
    assert_eq!(member0.team_id(), Some(summary.team_a));

    let member7 = service.find_member(summary.members[7]).unwrap().unwrap();
    assert_eq!(member7.age, 7);
    assert_eq!(member7.team_id(), Some(summary.team_b));

    let team_b_page = service
        .search_page(
            &MemberSearchCondition::default().team_name("teamB"),
            &PageRequest::of(0, 20),
            PageStrategy::Complex,
        )
        .unwrap();
    assert_eq!(team_b_page.total_elements(), 50);
    assert_eq!(team_b_page.total_pages(), 3);

    let teens = service
        .search(&MemberSearchCondition::default().age_goe(13).age_loe(19))
        .unwrap();
    assert_eq!(teens.len(), 7);
}
