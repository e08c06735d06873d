use std::time::Instant;

use xshell::{cmd, Shell};

fn main() -> xshell::Result<()> {
    let sh = Shell::new()?;

    {
        let _s = section("TEST");
        cmd!(sh, "cargo test --workspace").run()?;
        let greeting = cmd!(sh, "cargo run -q --example hello -- --emoji World").read()?;
        if !greeting.starts_with("Hello World") {
            panic!("unexpected demo output: {greeting}")
        }
    }

    {
        let _s = section("PUBLISH");

        let pkgid = cmd!(sh, "cargo pkgid -p optmatch").read()?;
        let version = pkgid.rsplit_once('#').map_or(pkgid.as_str(), |(_, it)| it).to_string();
        let tag = format!("v{version}");

        let current_branch = cmd!(sh, "git branch --show-current").read()?;
        let tag_exists =
            cmd!(sh, "git tag --list").read()?.split_ascii_whitespace().any(|it| it == tag);

        if current_branch == "master" && !tag_exists {
            cmd!(sh, "git tag {tag}").run()?;
            cmd!(sh, "cargo publish -p optmatch").run()?;
            cmd!(sh, "git push --tags").run()?;
        }
    }

    Ok(())
}

fn section(name: &'static str) -> impl Drop {
    println!("::group::{name}");
    let start = Instant::now();
    defer(move || {
        let elapsed = start.elapsed();
        eprintln!("{name}: {elapsed:.2?}");
        println!("::endgroup::");
    })
}

fn defer<F: FnOnce()>(f: F) -> impl Drop {
    struct D<F: FnOnce()>(Option<F>);
    impl<F: FnOnce()> Drop for D<F> {
        fn drop(&mut self) {
            if let Some(f) = self.0.take() {
                f()
            }
        }
    }
    D(Some(f))
}
