use expect_test::expect;
use optmatch::{ErrorKind, Handler, Resolver};

use crate::{build, check};

#[test]
fn bundled_flags() {
    let mut r = build(
        Resolver::builder().handler(Handler::new("main").flag("v").flag("o").positional("par")),
    );
    check(&mut r, "-vo file", expect![[r#"main(v=true, o=true, par="file")"#]]);
    check(&mut r, "-v -o file", expect![[r#"main(v=true, o=true, par="file")"#]]);
    check(&mut r, "file -ov", expect![[r#"main(v=true, o=true, par="file")"#]]);
    check(&mut r, "-vov file", expect![[r#"main(v=true, o=true, par="file")"#]]);
    check(&mut r, "-vo a=b", expect![[r#"main(v=true, o=true, par="a=b")"#]]);
    check(&mut r, "-vw file", expect!["unexpected flag `w` in argument `-vw`"]);
    check(&mut r, "-vo file more", expect!["unexpected argument: `more`"]);
    check(&mut r, "-v file", expect!["missing required flag `o`"]);
    check(&mut r, "-vo -", expect!["unexpected argument `-`"]);
    check(&mut r, "-vo --", expect!["unexpected argument `--`"]);
}

#[test]
fn separated_option_value() {
    let mut r =
        build(Resolver::builder().handler(Handler::new("main").option("opt").alias("opt", "o")));
    check(&mut r, "--opt value", expect![[r#"main(opt="value")"#]]);
    check(&mut r, "--opt=value", expect![[r#"main(opt="value")"#]]);
    check(&mut r, "--opt=a=b", expect![[r#"main(opt="a=b")"#]]);
    check(&mut r, "-o value", expect![[r#"main(opt="value")"#]]);
    check(&mut r, "-ovalue", expect![[r#"main(opt="value")"#]]);
    check(&mut r, "--opt=first --opt second", expect![[r#"main(opt="second")"#]]);
    check(&mut r, "--opt -value", expect!["incorrect option `opt`"]);
    check(&mut r, "--opt", expect!["incorrect option `opt`"]);
    check(&mut r, "-o", expect!["incorrect option `o`"]);
    check(&mut r, "-o a=h", expect!["incorrect option `o`"]);
}

#[test]
fn malformed_option_is_fatal() {
    let mut r = build(
        Resolver::builder()
            .handler(Handler::new("strict").option("opt"))
            .handler(Handler::new("loose").flag("opt").vararg("rest")),
    );
    let err = r.process(["prog", "--opt", "-x"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fatal);
    assert!(err.is_usage());
    assert_eq!(err.to_string(), "incorrect option `opt`");

    check(&mut r, "--opt value", expect![[r#"strict(opt="value")"#]]);
}

#[test]
fn flag_with_value() {
    let mut r = build(Resolver::builder().handler(Handler::new("main").flag("verbose")));
    check(&mut r, "--verbose", expect!["main(verbose=true)"]);
    check(&mut r, "--verbose --verbose", expect!["main(verbose=true)"]);
    check(&mut r, "--verbose=yes", expect!["incorrect flag `verbose`"]);
    check(&mut r, "--v", expect!["unexpected argument: `--v`"]);
}

#[test]
fn short_prefix() {
    let mut r = build(Resolver::builder().handler(Handler::new("main").prefix("D")));
    check(&mut r, "-Dname=value", expect!["main(D=[name=value])"]);
    check(&mut r, "-Dname", expect!["main(D=[name])"]);
    check(&mut r, "-D name=value", expect!["main(D=[name=value])"]);
    check(&mut r, "-Da=1 -Db -D c=3", expect!["main(D=[a=1, b, c=3])"]);
    check(&mut r, "", expect!["main(D=[])"]);
    check(&mut r, "-D=value", expect!["incorrect prefix usage on argument `-D=value`"]);
    check(&mut r, "-D name", expect!["incorrect prefix `D`"]);
    check(&mut r, "-D", expect!["incorrect prefix `D`"]);
    check(&mut r, "-D -Dx", expect!["incorrect prefix `D`"]);
}

#[test]
fn long_prefix() {
    let mut r = build(
        Resolver::builder().handler(Handler::new("main").prefix("define").prefix("def").flag("x")),
    );
    check(&mut r, "--definename=value -x", expect!["main(define=[name=value], def=[], x=true)"]);
    check(&mut r, "--defname=value -x", expect!["main(define=[], def=[name=value], x=true)"]);
    check(&mut r, "--define name=value -x", expect!["main(define=[name=value], def=[], x=true)"]);
    check(&mut r, "--definename -x", expect!["main(define=[name], def=[], x=true)"]);
    check(&mut r, "--define=value", expect!["incorrect prefix usage on argument `--define=value`"]);
    check(&mut r, "--define -x", expect!["incorrect prefix usage on argument `--define`"]);
}

#[test]
fn typed_options() {
    let mut r = build(
        Resolver::builder().handler(
            Handler::new("main")
                .int_option("count")
                .alias("count", "n")
                .float_option("ratio")
                .default_for("ratio", 1.0),
        ),
    );
    check(&mut r, "-n 92", expect!["main(count=92, ratio=1.0)"]);
    check(&mut r, "-n-3", expect!["main(count=-3, ratio=1.0)"]);
    check(&mut r, "--count=7 --ratio=0.5", expect!["main(count=7, ratio=0.5)"]);
    check(&mut r, "--count 7 --ratio 2", expect!["main(count=7, ratio=2.0)"]);
    check(&mut r, "--count=x", expect!["incorrect value for `count`"]);
    check(&mut r, "-n x", expect!["incorrect value for `n`"]);
    check(&mut r, "-n 1 --ratio=half", expect!["incorrect value for `ratio`"]);
    check(&mut r, "", expect!["missing required option `count`"]);
}

#[test]
fn positionals_and_vararg() {
    let mut r =
        build(Resolver::builder().handler(Handler::new("main").positional("src").vararg("rest")));
    check(&mut r, "a", expect![[r#"main(src="a")"#]]);
    check(&mut r, "a b c", expect![[r#"main(src="a", *["b", "c"])"#]]);
    check(&mut r, "", expect!["missing required parameter `src`"]);
}

#[test]
fn defaults() {
    let mut r = build(
        Resolver::builder().handler(
            Handler::new("main")
                .flag("verbose")
                .default_for("verbose", false)
                .positional("file")
                .default_for("file", "a.out"),
        ),
    );
    check(&mut r, "", expect![[r#"main(verbose=false, file="a.out")"#]]);
    check(&mut r, "--verbose b.out", expect![[r#"main(verbose=true, file="b.out")"#]]);
}

#[test]
fn gnu_ordering() {
    let mut r = build(
        Resolver::builder()
            .gnu(true)
            .handler(Handler::new("main").flag("a").positional("p1").positional("p2")),
    );
    check(&mut r, "-a par1 par2", expect![[r#"main(a=true, p1="par1", p2="par2")"#]]);
    check(&mut r, "-a par1 -v", expect!["unexpected argument `-v` after non option arguments"]);
    check(&mut r, "par1 par2 -a", expect!["unexpected argument `-a` after non option arguments"]);

    let err = r.process(["prog", "-a", "par1", "-v"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fatal);
}

#[test]
fn gnu_separate_value_ends_options() {
    let mut r = build(
        Resolver::builder().gnu(true).handler(
            Handler::new("main")
                .option("mode")
                .flag("v")
                .default_for("v", false)
                .positional("file")
                .default_for("file", "-"),
        ),
    );
    check(&mut r, "--mode fast -v", expect!["unexpected argument `-v` after non option arguments"]);
    check(&mut r, "--mode fast file", expect![[r#"main(mode="fast", v=false, file="file")"#]]);
    check(&mut r, "--mode=fast -v file", expect![[r#"main(mode="fast", v=true, file="file")"#]]);
    check(&mut r, "-v --mode fast", expect![[r#"main(mode="fast", v=true, file="-")"#]]);
    check(
        &mut r,
        "file --mode fast",
        expect!["unexpected argument `--mode` after non option arguments"],
    );
}

#[test]
fn gnu_fatal_does_not_depend_on_candidate_order() {
    let a = Handler::new("a").flag("opt").positional("p").flag("v");
    let b = Handler::new("b").option("opt").flag("v");

    let mut a_first = build(Resolver::builder().gnu(true).handler(a.clone()).handler(b.clone()));
    let mut b_first = build(Resolver::builder().gnu(true).handler(b).handler(a));
    for r in [&mut a_first, &mut b_first] {
        let err = r.process(["prog", "--opt", "value", "-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fatal);
        assert_eq!(err.to_string(), "unexpected argument `-v` after non option arguments");
    }
}

#[test]
fn without_gnu_options_follow_positionals() {
    let mut r = build(Resolver::builder().handler(Handler::new("main").flag("a").positional("p")));
    check(&mut r, "par -a", expect![[r#"main(a=true, p="par")"#]]);
}
