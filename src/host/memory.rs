//! Thread-safe in-memory host implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{GroupId, StrategyKey, UserId},
	host::{
		GroupDirectory, GroupRelations, HostError, HostFuture, ProvisionRequest, User,
		UserProvisioner,
	},
};

type HostState = Arc<RwLock<MemoryState>>;

#[derive(Debug, Default)]
struct MemoryState {
	users: BTreeMap<(StrategyKey, String), User>,
	groups: BTreeMap<String, GroupId>,
	memberships: BTreeMap<UserId, BTreeSet<GroupId>>,
	next_user: u64,
	next_group: u64,
	provisioning_failure: Option<String>,
	failing_groups: BTreeSet<GroupId>,
	membership_read_failure: Option<String>,
}

/// Host backend that keeps users, groups, and memberships in-process.
///
/// Failure injection ([`MemoryHost::fail_provisioning`], [`MemoryHost::fail_group`],
/// [`MemoryHost::fail_membership_reads`]) lets tests exercise the pipeline's error paths.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost(HostState);
impl MemoryHost {
	/// Registers a group and returns its identifier; existing names keep their identifier.
	pub fn define_group(&self, name: impl Into<String>) -> GroupId {
		let mut state = self.0.write();
		let name = name.into();

		if let Some(id) = state.groups.get(&name) {
			return *id;
		}

		state.next_group += 1;

		let id = GroupId(state.next_group);

		state.groups.insert(name, id);

		id
	}

	/// Renames or deletes a group in the directory without touching memberships.
	pub fn remove_group_name(&self, name: &str) -> Option<GroupId> {
		self.0.write().groups.remove(name)
	}

	/// Replaces the memberships of `user`.
	pub fn set_user_groups(&self, user: UserId, groups: impl IntoIterator<Item = GroupId>) {
		self.0.write().memberships.insert(user, groups.into_iter().collect());
	}

	/// Snapshot of the memberships of `user`.
	pub fn groups_of(&self, user: UserId) -> BTreeSet<GroupId> {
		self.0.read().memberships.get(&user).cloned().unwrap_or_default()
	}

	/// Looks up the user linked to a provider identity.
	pub fn user(&self, provider_key: &StrategyKey, provider_id: &str) -> Option<User> {
		self.0.read().users.get(&(provider_key.clone(), provider_id.to_owned())).cloned()
	}

	/// Number of provisioned users.
	pub fn user_count(&self) -> usize {
		self.0.read().users.len()
	}

	/// Makes every subsequent provisioning call fail with `message`; `None` restores success.
	pub fn fail_provisioning(&self, message: Option<&str>) {
		self.0.write().provisioning_failure = message.map(str::to_owned);
	}

	/// Makes relation changes targeting `group` fail.
	pub fn fail_group(&self, group: GroupId) {
		self.0.write().failing_groups.insert(group);
	}

	/// Makes every subsequent membership read fail with `message`; `None` restores success.
	pub fn fail_membership_reads(&self, message: Option<&str>) {
		self.0.write().membership_read_failure = message.map(str::to_owned);
	}

	fn memberships_now(state: HostState, user: UserId) -> Result<BTreeSet<GroupId>, HostError> {
		let state = state.read();

		if let Some(message) = state.membership_read_failure.clone() {
			return Err(HostError::Backend { message });
		}

		Ok(state.memberships.get(&user).cloned().unwrap_or_default())
	}

	fn provision_now(state: HostState, request: ProvisionRequest) -> Result<User, HostError> {
		let mut state = state.write();

		if let Some(message) = state.provisioning_failure.clone() {
			return Err(HostError::Backend { message });
		}

		let key = (request.provider_key.clone(), request.profile.id.clone());

		if let Some(user) = state.users.get_mut(&key) {
			user.profile = request.profile;

			return Ok(user.clone());
		}

		state.next_user += 1;

		let user = User {
			id: UserId(state.next_user),
			provider_key: request.provider_key,
			profile: request.profile,
		};

		state.users.insert(key, user.clone());

		Ok(user)
	}

	fn update_membership(
		state: HostState,
		user: UserId,
		group: GroupId,
		relate: bool,
	) -> Result<(), HostError> {
		let mut state = state.write();

		if state.failing_groups.contains(&group) {
			return Err(HostError::Backend { message: format!("group {group} is read-only") });
		}
		if !state.users.values().any(|stored| stored.id == user) {
			return Err(HostError::NotFound { entity: format!("user {user}") });
		}

		let groups = state.memberships.entry(user).or_default();

		if relate {
			groups.insert(group);
		} else {
			groups.remove(&group);
		}

		Ok(())
	}
}
impl UserProvisioner for MemoryHost {
	fn process_profile(&self, request: ProvisionRequest) -> HostFuture<'_, User> {
		let state = self.0.clone();

		Box::pin(async move { Self::provision_now(state, request) })
	}
}
impl GroupRelations for MemoryHost {
	fn user_group_ids(&self, user: UserId) -> HostFuture<'_, BTreeSet<GroupId>> {
		let state = self.0.clone();

		Box::pin(async move { Self::memberships_now(state, user) })
	}

	fn relate_user_to_group(&self, user: UserId, group: GroupId) -> HostFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move { Self::update_membership(state, user, group, true) })
	}

	fn unrelate_user_from_group(&self, user: UserId, group: GroupId) -> HostFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move { Self::update_membership(state, user, group, false) })
	}
}
impl GroupDirectory for MemoryHost {
	fn group_id_by_name(&self, name: &str) -> Option<GroupId> {
		self.0.read().groups.get(name).copied()
	}
}
