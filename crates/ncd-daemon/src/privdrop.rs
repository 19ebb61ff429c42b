//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Drops root privileges to a configured user/group, grounded on
//! `holo-daemon::main::privdrop`. This implementation has no
//! NET_ADMIN/NET_BIND_SERVICE-requiring sockets to retain capabilities
//! for (unlike the teacher's routing protocols, which bind raw and
//! privileged ports), so the capability-preservation half of the
//! teacher's version is dropped along with its `capctl` dependency;
//! only the uid/gid transition remains.

use nix::unistd::User;

pub fn drop_to(user: &str) -> nix::Result<()> {
    match User::from_name(user)? {
        Some(user) => {
            nix::unistd::setgroups(&[user.gid])?;
            nix::unistd::setresgid(user.gid, user.gid, user.gid)?;
            nix::unistd::setresuid(user.uid, user.uid, user.uid)?;
            Ok(())
        }
        None => {
            tracing::error!(name = %user, "failed to find user");
            std::process::exit(1);
        }
    }
}
