//! Collaborator contracts implemented by the host identity system.
//!
//! The login pipeline never reaches for process-wide registries: user provisioning, group
//! relations, and the group-name directory are handed in as trait objects so every piece can be
//! swapped for [`MemoryHost`] in tests.

pub mod memory;

pub use memory::MemoryHost;

// self
use crate::{
	_prelude::*,
	auth::{GroupId, StrategyKey, UserId},
	profile::CanonicalProfile,
};

/// Boxed future returned by host collaborator calls.
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, HostError>> + 'a + Send>>;

/// Creates or updates the local user for a provider identity.
pub trait UserProvisioner
where
	Self: Send + Sync,
{
	/// Upserts the user described by `request` and returns the stored record.
	fn process_profile(&self, request: ProvisionRequest) -> HostFuture<'_, User>;
}

/// Reads and mutates local group memberships.
pub trait GroupRelations
where
	Self: Send + Sync,
{
	/// Current group memberships of `user`.
	fn user_group_ids(&self, user: UserId) -> HostFuture<'_, BTreeSet<GroupId>>;

	/// Adds `user` to `group`; adding an existing membership is not an error.
	fn relate_user_to_group(&self, user: UserId, group: GroupId) -> HostFuture<'_, ()>;

	/// Removes `user` from `group`; removing a missing membership is not an error.
	fn unrelate_user_from_group(&self, user: UserId, group: GroupId) -> HostFuture<'_, ()>;
}

/// Read-only lookup from group name to group identifier.
///
/// Queried on every reconciliation so renamed or deleted groups are picked up between logins.
pub trait GroupDirectory
where
	Self: Send + Sync,
{
	/// Resolves `name`, returning `None` for unknown groups.
	fn group_id_by_name(&self, name: &str) -> Option<GroupId>;
}
impl GroupDirectory for BTreeMap<String, GroupId> {
	fn group_id_by_name(&self, name: &str) -> Option<GroupId> {
		self.get(name).copied()
	}
}
impl GroupDirectory for std::collections::HashMap<String, GroupId> {
	fn group_id_by_name(&self, name: &str) -> Option<GroupId> {
		self.get(name).copied()
	}
}

/// Error type produced by host collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum HostError {
	/// Backend-level failure for the host's storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// Referenced user or group does not exist.
	#[error("{entity} not found.")]
	NotFound {
		/// Description of the missing entity.
		entity: String,
	},
}

/// Input handed to [`UserProvisioner::process_profile`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
	/// Strategy instance the identity logged in through.
	pub provider_key: StrategyKey,
	/// Normalized provider identity.
	pub profile: CanonicalProfile,
}

/// Local user record returned by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// Host-side identifier.
	pub id: UserId,
	/// Strategy instance the user is linked to.
	pub provider_key: StrategyKey,
	/// Last provisioned identity.
	pub profile: CanonicalProfile,
}

/// Host collaborators used by one login pipeline.
#[derive(Clone)]
pub struct HostServices {
	/// User upsert interface.
	pub users: Arc<dyn UserProvisioner>,
	/// Group membership interface.
	pub relations: Arc<dyn GroupRelations>,
	/// Group name registry.
	pub directory: Arc<dyn GroupDirectory>,
}
impl HostServices {
	/// Bundles independent collaborators.
	pub fn new(
		users: Arc<dyn UserProvisioner>,
		relations: Arc<dyn GroupRelations>,
		directory: Arc<dyn GroupDirectory>,
	) -> Self {
		Self { users, relations, directory }
	}

	/// Uses one host object for every collaborator role.
	pub fn from_host<H>(host: Arc<H>) -> Self
	where
		H: 'static + UserProvisioner + GroupRelations + GroupDirectory,
	{
		Self { users: host.clone(), relations: host.clone(), directory: host }
	}
}
impl Debug for HostServices {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HostServices").finish_non_exhaustive()
	}
}
