//! Application-scoped configuration, replacing the module-level settings
//! singletons the source keeps for JSON/HTML/CSRF configuration (see
//! SPEC_FULL §9's "global mutable state" design note). Built once via
//! [`SettingsBuilder`] and shared through the service container — never
//! mutated after startup.

use std::collections::HashSet;
use std::net::IpAddr;

use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct ForwardedHeadersPolicy {
	pub allowed_hosts: HashSet<String>,
	pub known_proxies: HashSet<IpAddr>,
	pub known_networks: Vec<IpNet>,
	pub forward_limit: usize,
}

impl Default for ForwardedHeadersPolicy {
	fn default() -> Self {
		Self {
			allowed_hosts: HashSet::new(),
			known_proxies: HashSet::new(),
			known_networks: Vec::new(),
			forward_limit: 1,
		}
	}
}

impl ForwardedHeadersPolicy {
	pub fn trusts(&self, proxy: IpAddr) -> bool {
		self.known_proxies.contains(&proxy) || self.known_networks.iter().any(|net| net.contains(&proxy))
	}

	pub fn host_allowed(&self, host: &str) -> bool {
		self.allowed_hosts.is_empty() || self.allowed_hosts.contains(host)
	}
}

#[derive(Debug, Clone)]
pub struct Settings {
	/// Whether 500-class responses include the error's debug text.
	pub show_error_details: bool,
	/// HMAC secret used to sign CSRF tokens.
	pub csrf_secret: Vec<u8>,
	/// Minimum response body size, in bytes, before gzip kicks in.
	pub gzip_min_size: usize,
	/// Per-part size, in bytes, above which a multipart field spills to disk.
	pub spool_max_size: usize,
	/// Hard cap on any single non-file multipart field, in bytes.
	pub max_field_size: usize,
	pub forwarded_headers: ForwardedHeadersPolicy,
	/// Capacity of the router's LRU route-match cache.
	pub route_cache_capacity: usize,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			show_error_details: false,
			csrf_secret: Vec::new(),
			gzip_min_size: 1024,
			spool_max_size: 1024 * 1024,
			max_field_size: 16 * 1024 * 1024,
			forwarded_headers: ForwardedHeadersPolicy::default(),
			// BlackSheep's router caches up to 1200 matches; kept as precedent.
			route_cache_capacity: 1200,
		}
	}
}

#[derive(Default)]
pub struct SettingsBuilder {
	settings: Settings,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn show_error_details(mut self, value: bool) -> Self {
		self.settings.show_error_details = value;
		self
	}

	pub fn csrf_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
		self.settings.csrf_secret = secret.into();
		self
	}

	pub fn gzip_min_size(mut self, size: usize) -> Self {
		self.settings.gzip_min_size = size;
		self
	}

	pub fn spool_max_size(mut self, size: usize) -> Self {
		self.settings.spool_max_size = size;
		self
	}

	pub fn max_field_size(mut self, size: usize) -> Self {
		self.settings.max_field_size = size;
		self
	}

	pub fn forwarded_headers(mut self, policy: ForwardedHeadersPolicy) -> Self {
		self.settings.forwarded_headers = policy;
		self
	}

	pub fn route_cache_capacity(mut self, capacity: usize) -> Self {
		self.settings.route_cache_capacity = capacity;
		self
	}

	pub fn build(self) -> Settings {
		self.settings
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_sane() {
		let settings = Settings::default();
		assert!(!settings.show_error_details);
		assert_eq!(settings.route_cache_capacity, 1200);
	}

	#[test]
	fn builder_overrides_defaults() {
		let settings = SettingsBuilder::new()
			.show_error_details(true)
			.gzip_min_size(2048)
			.build();
		assert!(settings.show_error_details);
		assert_eq!(settings.gzip_min_size, 2048);
	}
}
