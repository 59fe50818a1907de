//! P1 Remote Tests: Submodule Freshness
//!
//! Fetches each submodule's origin and asserts the checked-out revision
//! matches the remote default-branch tip. Needs network access and git
//! credentials for the submodule remotes.

#![cfg(feature = "remote")]

use deploy_tests::exec::SystemRunner;
use deploy_tests::stack_root;
use deploy_tests::submodule::{check_freshness, SUBMODULES};

#[tokio::test]
async fn test_submodules_match_remote_tips() {
    let root = stack_root();
    let runner = SystemRunner;

    for name in SUBMODULES {
        check_freshness(&runner, &root, name)
            .await
            .unwrap_or_else(|err| panic!("{err}"));
    }
}
