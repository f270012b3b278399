//! Group reconciler: derive and apply the minimal membership change for managed groups.
//!
//! A group is *managed* when its name appears as a value in the role mapping. Only managed groups
//! are ever added or removed; memberships granted any other way are left alone.

// crates.io
use futures::future;
// self
use crate::{
	_prelude::*,
	auth::{GroupId, RoleId},
	config::RoleMappings,
	host::{GroupDirectory, GroupRelations, HostError, User},
	obs,
};

/// Membership changes for one user.
///
/// The two sets never intersect: additions come from expected groups the user lacks, removals
/// from current groups that are not expected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationPlan {
	/// Groups the user must join.
	pub groups_to_add: BTreeSet<GroupId>,
	/// Managed groups the user must leave.
	pub groups_to_remove: BTreeSet<GroupId>,
}
impl ReconciliationPlan {
	/// Returns true when nothing needs to change.
	pub fn is_empty(&self) -> bool {
		self.groups_to_add.is_empty() && self.groups_to_remove.is_empty()
	}
}

/// Result of [`apply_plan`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
	/// Groups successfully joined.
	pub added: BTreeSet<GroupId>,
	/// Groups successfully left.
	pub removed: BTreeSet<GroupId>,
	/// Changes the host refused.
	pub failed: Vec<(GroupId, HostError)>,
}
impl SyncReport {
	/// Returns true when every change went through.
	pub fn is_complete(&self) -> bool {
		self.failed.is_empty()
	}
}

/// Computes the plan bringing `current` in line with `member_roles` under `mappings`.
///
/// Group names the directory cannot resolve are skipped.
pub fn reconcile(
	member_roles: &[RoleId],
	mappings: &RoleMappings,
	current: &BTreeSet<GroupId>,
	directory: &dyn GroupDirectory,
) -> ReconciliationPlan {
	let managed = mappings
		.group_names()
		.into_iter()
		.filter_map(|name| directory.group_id_by_name(name))
		.collect::<BTreeSet<_>>();
	let expected = mappings
		.iter()
		.filter(|(role, _)| member_roles.contains(*role))
		.filter_map(|(_, name)| directory.group_id_by_name(name))
		.collect::<BTreeSet<_>>();
	let groups_to_add = expected.difference(current).copied().collect();
	let groups_to_remove = current
		.intersection(&managed)
		.filter(|group| !expected.contains(*group))
		.copied()
		.collect();

	ReconciliationPlan { groups_to_add, groups_to_remove }
}

/// Applies `plan` for `user`, issuing every change concurrently.
///
/// A failed change never stops the others; failures are logged and collected in the report.
pub async fn apply_plan(
	relations: &dyn GroupRelations,
	user: &User,
	plan: &ReconciliationPlan,
) -> SyncReport {
	let additions = plan.groups_to_add.iter().map(|&group| async move {
		(group, true, relations.relate_user_to_group(user.id, group).await)
	});
	let removals = plan.groups_to_remove.iter().map(|&group| async move {
		(group, false, relations.unrelate_user_from_group(user.id, group).await)
	});
	let (added, removed) = future::join(future::join_all(additions), future::join_all(removals)).await;
	let mut report = SyncReport::default();

	for (group, relate, result) in added.into_iter().chain(removed) {
		match result {
			Ok(()) if relate => {
				report.added.insert(group);
			},
			Ok(()) => {
				report.removed.insert(group);
			},
			Err(e) => {
				obs::warn_group_sync_failure(user.id, Some(group), &e);

				report.failed.push((group, e));
			},
		}
	}

	report
}
