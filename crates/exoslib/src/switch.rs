//! Switch handle - issues CLI queries and reshapes their replies.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument};

use exos_cli_common::{CliRequest, CliResult, CommandExecutor, ExecContext, VirtualRouter};

use crate::cfgmgr::CfgmgrReply;
use crate::commands::{self, LINK_STATE_UP, OPERATIONAL_CARD_STATE, PORT_STATUS_SUCCESS};
use crate::config_areas::{self, ConfigSegment, TrailingModule};
use crate::platform::{Platform, PlatformVars};
use crate::reply::{self, ReplyRecord};
use crate::types::{PortVlan, SlotCongestion, VlanPorts};

/// Handle to one switch, reached through a command executor.
///
/// Every query runs exactly one CLI command (except [`Switch::ip_stats`],
/// which runs one per VLAN) in the handle's [`ExecContext`].
pub struct Switch<E> {
    /// Host command interface.
    executor: E,

    /// Context attached to every request.
    ctx: ExecContext,

    /// Platform variables used by platform-dependent queries.
    platform_vars: PlatformVars,
}

impl<E: CommandExecutor> Switch<E> {
    /// Creates a handle reading platform variables from the environment.
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            ctx: ExecContext::default(),
            platform_vars: PlatformVars::from_env(),
        }
    }

    /// Runs subsequent commands in `vr`.
    pub fn with_virtual_router(mut self, vr: VirtualRouter) -> Self {
        self.ctx.vr = Some(vr);
        self
    }

    /// Replaces the platform variables.
    pub fn with_platform_vars(mut self, vars: PlatformVars) -> Self {
        self.platform_vars = vars;
        self
    }

    /// Changes the virtual router for subsequent commands.
    pub fn set_virtual_router(&mut self, vr: Option<VirtualRouter>) {
        self.ctx.vr = vr;
    }

    /// Returns the current execution context.
    pub fn context(&self) -> &ExecContext {
        &self.ctx
    }

    /// Returns the underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs a command and returns its captured text output.
    pub fn run(&self, command: &str) -> CliResult<String> {
        self.executor.execute(&CliRequest::text(command, &self.ctx))
    }

    fn cfgmgr(&self, command: &str) -> CliResult<CfgmgrReply> {
        let output = self.run(command)?;
        CfgmgrReply::parse(command, &output)
    }

    /// Returns the modules with non-default configuration.
    #[instrument(skip(self))]
    pub fn configured_modules(&self) -> CliResult<Vec<String>> {
        let dump = self.run(commands::SHOW_CONFIG_CMD)?;
        let modules = config_areas::configured_modules(&dump);
        info!(count = modules.len(), "Found configured modules");
        Ok(modules)
    }

    /// Returns configured modules with their dump text.
    #[instrument(skip(self))]
    pub fn configured_segments(&self, trailing: TrailingModule) -> CliResult<Vec<ConfigSegment>> {
        let dump = self.run(commands::SHOW_CONFIG_CMD)?;
        Ok(config_areas::configured_segments_with(&dump, trailing))
    }

    /// Runs `command` with XML output and flattens the reply.
    #[instrument(skip(self))]
    pub fn show_data(&self, command: &str) -> CliResult<Vec<ReplyRecord>> {
        let xml = self
            .executor
            .execute(&CliRequest::xml(command, &self.ctx))?;
        reply::parse_reply_records(&xml)
    }

    /// Returns the ports whose link is up.
    #[instrument(skip(self))]
    pub fn active_ports(&self) -> CliResult<Vec<String>> {
        let reply = self.cfgmgr(&commands::build_ports_info_cmd())?;
        let mut ports = Vec::new();
        for row in reply.rows() {
            if reply.field(row, "linkState")? == LINK_STATE_UP {
                ports.push(reply.field(row, "port")?);
            }
        }
        debug!(count = ports.len(), "Active ports");
        Ok(ports)
    }

    /// Returns a CLI port list covering every port on the device.
    #[instrument(skip(self))]
    pub fn all_ports(&self) -> CliResult<String> {
        let reply = self.cfgmgr(&commands::build_all_ports_cmd())?;
        reply.field(reply.first()?, "portList")
    }

    /// Returns the VLANs `port` belongs to.
    #[instrument(skip(self))]
    pub fn port_vlans(&self, port: &str) -> CliResult<Vec<PortVlan>> {
        let reply = self.cfgmgr(&commands::build_port_vlans_cmd(port))?;
        reply
            .rows()
            .iter()
            .map(|row| {
                Ok(PortVlan {
                    name: reply.field(row, "vlanName")?,
                    id: reply.field(row, "vlanId")?,
                    tag: reply.field(row, "tagStatus")?,
                })
            })
            .collect()
    }

    /// Returns the names of all VLANs created on the switch.
    #[instrument(skip(self))]
    pub fn vlans(&self) -> CliResult<BTreeSet<String>> {
        let reply = self.cfgmgr(&commands::build_vlans_cmd())?;
        reply
            .rows()
            .iter()
            .map(|row| reply.field(row, "name"))
            .collect()
    }

    /// Returns the untagged and tagged port lists of `vlan`.
    #[instrument(skip(self))]
    pub fn vlan_ports(&self, vlan: &str) -> CliResult<VlanPorts> {
        let reply = self.cfgmgr(&commands::build_vlan_ports_cmd(vlan))?;
        let row = reply.first()?;
        Ok(VlanPorts {
            untagged: reply.field(row, "untaggedPorts")?,
            tagged: reply.field(row, "taggedPorts")?,
        })
    }

    /// Returns the first IP statistics record of every VLAN that has one.
    #[instrument(skip(self))]
    pub fn ip_stats(&self) -> CliResult<Vec<ReplyRecord>> {
        let mut stats = Vec::new();
        for vlan in self.vlans()? {
            let records = self.show_data(&commands::build_ip_stats_cmd(&vlan))?;
            match records.into_iter().next() {
                Some(record) => stats.push(record),
                None => debug!(vlan = %vlan, "No IP statistics for VLAN"),
            }
        }
        Ok(stats)
    }

    /// Returns CPU and fabric congestion for every slot.
    #[instrument(skip(self))]
    pub fn congestion(&self) -> CliResult<Vec<SlotCongestion>> {
        let reply = self.cfgmgr(&commands::build_congestion_cmd())?;
        reply
            .rows()
            .iter()
            .map(|row| {
                Ok(SlotCongestion {
                    slot: reply.field(row, "slot")?,
                    cpu_cng: reply.field(row, "cpu_cng")?,
                    fabric_cng: reply.field(row, "fabric_cng")?,
                })
            })
            .collect()
    }

    /// Returns true if the link of `port` is up.
    #[instrument(skip(self))]
    pub fn is_port_active(&self, port: &str) -> CliResult<bool> {
        let reply = self.cfgmgr(&commands::build_port_state_cmd(port))?;
        Ok(reply.field(reply.first()?, "linkState")? == LINK_STATE_UP)
    }

    /// Returns the device platform.
    pub fn platform(&self) -> CliResult<Platform> {
        Platform::from_vars(&self.platform_vars)
    }

    /// Returns the operational slots, in first-seen order.
    ///
    /// A standalone Summit always reports slot 1 without querying.
    #[instrument(skip(self))]
    pub fn operational_slots(&self) -> CliResult<Vec<String>> {
        if self.platform()? == Platform::Summit {
            return Ok(vec!["1".to_string()]);
        }

        let reply = self.cfgmgr(&commands::build_card_info_cmd())?;
        let mut slots: Vec<String> = Vec::new();
        for row in reply.rows() {
            if reply.field(row, "card_state_str")? != OPERATIONAL_CARD_STATE {
                continue;
            }
            let slot = reply.field(row, "slot")?;
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        Ok(slots)
    }

    /// Returns true if the switch accepts `port` as a port list.
    #[instrument(skip(self))]
    pub fn port_is_valid(&self, port: &str) -> CliResult<bool> {
        let reply = self.cfgmgr(&commands::build_port_check_cmd(port))?;
        Ok(reply.field(reply.first()?, "status")? == PORT_STATUS_SUCCESS)
    }
}
