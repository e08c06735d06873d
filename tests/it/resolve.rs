use expect_test::expect;
use optmatch::{ErrorKind, Handler, Resolver, Value};

use crate::{build, check};

#[test]
fn backtracks_to_next_candidate() {
    let mut r = build(
        Resolver::builder()
            .handler(Handler::new("a").required_flag("k").flag("v"))
            .handler(Handler::new("b").flag("v")),
    );
    check(&mut r, "-v", expect!["b(v=true)"]);
    check(&mut r, "-k -v", expect!["a(v=true)"]);
    check(&mut r, "-kv", expect!["a(v=true)"]);
}

#[test]
fn priority_order() {
    let mut r = build(
        Resolver::builder()
            .handler(Handler::new("first").flag("v"))
            .handler(Handler::new("low").flag("v").priority(-1))
            .handler(Handler::new("second").flag("v"))
            .handler(Handler::new("high").flag("v").priority(10)),
    );
    let order = r.candidates().map(|it| it.name()).collect::<Vec<_>>();
    assert_eq!(order, ["high", "first", "second", "low"]);
    check(&mut r, "-v", expect!["high(v=true)"]);
}

#[test]
fn deepest_failure_wins() {
    let mut r = build(
        Resolver::builder()
            .handler(Handler::new("one").flag("a"))
            .handler(Handler::new("two").flag("a").flag("b"))
            .handler(Handler::new("three").flag("b")),
    );
    check(&mut r, "-a -b -c", expect!["unexpected flag `c` in argument `-c`"]);
    check(&mut r, "-ab -c", expect!["unexpected flag `c` in argument `-c`"]);
    check(&mut r, "-abc", expect!["unexpected flag `c` in argument `-abc`"]);

    let mut r = build(
        Resolver::builder()
            .handler(Handler::new("list").flag("l"))
            .handler(Handler::new("copy").positional("src").positional("dst")),
    );
    check(&mut r, "a", expect!["missing required parameter `dst`"]);
}

#[test]
fn ties_keep_the_first_failure() {
    let mut r = build(
        Resolver::builder()
            .handler(Handler::new("one").flag("x"))
            .handler(Handler::new("two").flag("y")),
    );
    check(&mut r, "-z", expect!["unexpected flag `z` in argument `-z`"]);
    check(&mut r, "", expect!["missing required flag `x`"]);

    let err = r.process(["prog", "-z"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
}

#[test]
fn state_does_not_leak_between_calls() {
    let mut r = build(
        Resolver::builder().handler(
            Handler::new("main").flag("v").default_for("v", false).prefix("D").vararg("rest"),
        ),
    );
    check(&mut r, "-v -Da=1 x y", expect![[r#"main(v=true, D=[a=1], *["x", "y"])"#]]);
    check(&mut r, "", expect!["main(v=false, D=[])"]);
    check(&mut r, "-Db", expect!["main(v=false, D=[b])"]);
    check(&mut r, "-Db", expect!["main(v=false, D=[b])"]);
}

#[test]
fn state_does_not_leak_between_trials() {
    let mut r = build(
        Resolver::builder()
            .common(Handler::new("defs").prefix("D"))
            .handler(Handler::new("first").flag("x"))
            .handler(Handler::new("second").flag("y")),
    );
    check(
        &mut r,
        "-Da -y",
        expect![[r#"
            defs(D=[a])
            second(y=true)
        "#]],
    );

    let mut r = build(
        Resolver::builder()
            .handler(Handler::new("greedy").prefix("D").flag("x"))
            .handler(Handler::new("other").prefix("D").flag("y")),
    );
    check(&mut r, "-Da -y", expect!["other(D=[a], y=true)"]);
}

#[test]
fn invocation_accessors() {
    let mut r = build(
        Resolver::builder()
            .handler(Handler::new("main").flag("v").default_for("v", false).option("mode")),
    );
    let matched = r.process(["prog", "--mode=fast"]).unwrap();
    assert!(matched.commons.is_empty());
    let inv = matched.invocation;
    assert_eq!(inv.handler, "main");
    assert!(!inv.flag("v"));
    assert_eq!(inv.get("mode"), Some(&Value::from("fast")));
    assert_eq!(inv.get("other"), None);
}

#[test]
fn commons_run_alongside_candidates() {
    let mut r = build(
        Resolver::builder()
            .common(Handler::new("global").flag("verbose").default_for("verbose", false))
            .common(Handler::new("log").option("log-file"))
            .handler(Handler::new("build").positional("target"))
            .handler(Handler::new("clean").flag("all")),
    );
    check(
        &mut r,
        "--verbose x86",
        expect![[r#"
            global(verbose=true)
            build(target="x86")
        "#]],
    );
    check(
        &mut r,
        "x86",
        expect![[r#"
            global(verbose=false)
            build(target="x86")
        "#]],
    );
    check(
        &mut r,
        "--log-file=out.txt --all",
        expect![[r#"
            global(verbose=false)
            log(log-file="out.txt")
            clean(all=true)
        "#]],
    );
    check(&mut r, "--all --fast", expect!["unexpected argument: `--fast`"]);
    check(&mut r, "--log-file", expect!["incorrect option `log-file`"]);
}

#[test]
fn common_that_received_input_must_be_complete() {
    let mut r = build(
        Resolver::builder()
            .common(Handler::new("io").option("input").option("output"))
            .handler(Handler::new("run").vararg("args")),
    );
    check(&mut r, "a b", expect![[r#"run(*["a", "b"])"#]]);
    check(&mut r, "--input=x a", expect!["missing required option `output`"]);
    check(
        &mut r,
        "--input=x --output=y a",
        expect![[r#"
            io(input="x", output="y")
            run(*["a"])
        "#]],
    );
}

#[test]
fn no_handlers_is_a_config_error() {
    let err = Resolver::builder().build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(err.to_string(), "no handlers to match the command line against");
}
