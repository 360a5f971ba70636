//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::fs;

    use assert_cmd::Command;

    use gr8s_prepare::parsers::html::template::{PAGE_TITLE, REMOVE_PRERENDERED_TEXT};

    use crate::common::SPA_INDEX;

    fn command() -> Command {
        let mut cmd = Command::cargo_bin("gr8s-prepare-index-html").unwrap();
        cmd.env_remove("GR8S_LOG_LEVEL")
            .env_remove("GR8S_DIFF_TIMEOUT_MS")
            .env_remove("GR8S_DIFF_CONTEXT")
            .env("NO_COLOR", "1");
        cmd
    }

    #[test]
    fn explicit_index() {
        let root = tempfile::tempdir().unwrap();
        let index = root.path().join("index.html");
        fs::write(&index, SPA_INDEX).unwrap();

        let out = command().arg("-f").arg(&index).output().unwrap();

        assert!(out.status.success());
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(stdout.contains("The original source was backed up in"));
        assert!(stdout.contains("index.html.bak"));
        assert!(stdout.contains("Your gr8s-enabled html file is in"));

        assert_eq!(
            fs::read_to_string(root.path().join("index.html.bak")).unwrap(),
            SPA_INDEX
        );
        let prepared = fs::read_to_string(&index).unwrap();
        assert!(prepared.contains(PAGE_TITLE));
        assert!(!prepared.contains(REMOVE_PRERENDERED_TEXT));
    }

    #[test]
    fn status_messages_are_plain() {
        let root = tempfile::tempdir().unwrap();
        let index = root.path().join("index.html");
        fs::write(&index, SPA_INDEX).unwrap();

        let with_no_color = command().arg("-f").arg(&index).output().unwrap();
        fs::write(&index, SPA_INDEX).unwrap();
        // Piped output gets no colors even without NO_COLOR
        let piped = command()
            .env_remove("NO_COLOR")
            .arg("-f")
            .arg(&index)
            .output()
            .unwrap();

        for out in [with_no_color, piped] {
            assert!(out.status.success());
            let stdout = String::from_utf8_lossy(&out.stdout);
            assert!(stdout.contains("Your gr8s-enabled html file is in"));
            assert!(!stdout.contains('\x1b'));
        }
    }

    #[test]
    fn guessed_index() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("dist")).unwrap();
        fs::write(root.path().join("dist/index.html"), SPA_INDEX).unwrap();

        let out = command().current_dir(root.path()).output().unwrap();

        assert!(out.status.success());
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(stdout.contains("No index.html path provided. Trying to guess ..."));
        assert!(stdout.contains("you (probably) use nuxt.js"));
        assert!(root.path().join("dist/index.html.bak").is_file());
    }

    #[test]
    fn removal_script_flags() {
        let root = tempfile::tempdir().unwrap();
        let index = root.path().join("index.html");
        fs::write(&index, SPA_INDEX).unwrap();

        command()
            .arg("--index")
            .arg(&index)
            .arg("-c")
            .arg("--js-remove-links")
            .assert()
            .success();

        let prepared = fs::read_to_string(&index).unwrap();
        assert!(prepared.contains(REMOVE_PRERENDERED_TEXT));
        assert!(prepared.contains("document.querySelectorAll('.add-link')"));
    }

    #[test]
    fn verbose_prints_the_diff() {
        let root = tempfile::tempdir().unwrap();
        let index = root.path().join("index.html");
        fs::write(&index, SPA_INDEX).unwrap();

        let out = command().arg("-v").arg("-f").arg(&index).output().unwrap();

        assert!(out.status.success());
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(stdout.contains("Enriched index.html. Here is the diff:"));
        assert!(stdout.contains("\t> "));
        assert!(stdout.contains("{+"));
        // Plain markers only, stdout is not a terminal
        assert!(!stdout.contains("\x1b[1;32m{{"));
    }

    #[test]
    fn help_lists_environment_variables() {
        let out = command().arg("--help").output().unwrap();

        assert!(out.status.success());
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(stdout.contains("Environment variables:"));
        for name in ["GR8S_LOG_LEVEL", "NO_COLOR", "GR8S_DIFF_TIMEOUT_MS", "GR8S_DIFF_CONTEXT"] {
            assert!(stdout.contains(name), "{name} missing from --help");
        }
    }

    #[test]
    fn minify_flag() {
        let root = tempfile::tempdir().unwrap();
        let index = root.path().join("index.html");
        fs::write(&index, SPA_INDEX).unwrap();

        command().arg("-m").arg("-f").arg(&index).assert().success();

        let prepared = fs::read_to_string(&index).unwrap();
        assert!(prepared.contains(PAGE_TITLE));
        assert!(!prepared.contains("\n      <main>"));
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use std::fs;

    use assert_cmd::Command;

    use crate::common::SPA_INDEX;

    fn command() -> Command {
        let mut cmd = Command::cargo_bin("gr8s-prepare-index-html").unwrap();
        cmd.env_remove("GR8S_LOG_LEVEL")
            .env_remove("GR8S_DIFF_TIMEOUT_MS")
            .env_remove("GR8S_DIFF_CONTEXT")
            .env("NO_COLOR", "1");
        cmd
    }

    #[test]
    fn second_run_is_refused() {
        let root = tempfile::tempdir().unwrap();
        let index = root.path().join("index.html");
        fs::write(&index, SPA_INDEX).unwrap();

        command().arg("-f").arg(&index).assert().success();
        let prepared = fs::read_to_string(&index).unwrap();

        let out = command().arg("-f").arg(&index).output().unwrap();

        assert_eq!(out.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.contains("Error processing the file:"));
        assert!(stderr.contains(
            "It seems your HTML was already processed. Please use this program on raw unprocessed html"
        ));
        // Neither the index nor the first backup were touched
        assert_eq!(fs::read_to_string(&index).unwrap(), prepared);
        assert_eq!(
            fs::read_to_string(root.path().join("index.html.bak")).unwrap(),
            SPA_INDEX
        );
    }

    #[test]
    fn nothing_to_guess() {
        let root = tempfile::tempdir().unwrap();

        let out = command().current_dir(root.path()).output().unwrap();

        assert_eq!(out.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&out.stderr).contains("Failed to find index.html"));
    }

    #[test]
    fn missing_index() {
        let root = tempfile::tempdir().unwrap();
        let index = root.path().join("nope.html");

        let out = command().arg("-f").arg(&index).output().unwrap();

        assert_eq!(out.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.contains("nope.html"));
        assert!(!stderr.contains('\x1b'));
        assert!(!root.path().join("nope.html.bak").exists());
    }

    #[test]
    fn invalid_log_level() {
        let root = tempfile::tempdir().unwrap();
        let index = root.path().join("index.html");
        fs::write(&index, SPA_INDEX).unwrap();

        let out = command()
            .env("GR8S_LOG_LEVEL", "chatty")
            .arg("-f")
            .arg(&index)
            .output()
            .unwrap();

        assert_eq!(out.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&out.stderr).contains("GR8S_LOG_LEVEL"));
        assert_eq!(fs::read_to_string(&index).unwrap(), SPA_INDEX);
    }
}
