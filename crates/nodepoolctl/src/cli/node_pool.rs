//! Node pool command definitions

use clap::Subcommand;

use super::WaitArgs;

/// Node pool commands
#[derive(Subcommand, Debug)]
pub enum NodePoolCommands {
    /// List node pools in a cluster
    #[command(visible_alias = "ls")]
    List {
        /// Cluster id
        #[arg(long)]
        cluster_id: String,

        /// Only pools with this name
        #[arg(long)]
        name: Option<String>,
    },

    /// Get a node pool by id, or by name within a cluster
    #[command(after_help = "EXAMPLES:
    nodepoolctl node-pool get ocid1.nodepool.oc1..xxx
    nodepoolctl node-pool get --cluster-id ocid1.cluster.oc1..xxx --name workers
")]
    Get {
        /// Node pool id
        #[arg(required_unless_present = "name", conflicts_with = "name")]
        id: Option<String>,

        /// Cluster to search by name
        #[arg(long, requires = "name")]
        cluster_id: Option<String>,

        /// Node pool name
        #[arg(long, requires = "cluster_id")]
        name: Option<String>,
    },

    /// Create a node pool
    #[command(after_help = "EXAMPLES:
    # From a file
    nodepoolctl node-pool create --data @pool.json --wait

    # Inline; compartmentId defaults to the profile's
    nodepoolctl node-pool create --data '{\"clusterId\":\"ocid1.cluster.oc1..xxx\",\"name\":\"workers\",\"kubernetesVersion\":\"v1.29.1\",\"nodeShape\":\"VM.Standard.E4.Flex\",\"subnetIds\":[\"ocid1.subnet.oc1..a\"],\"quantityPerSubnet\":2}'
")]
    Create {
        /// Request body (JSON string or @file)
        #[arg(long)]
        data: String,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Update a node pool
    Update {
        /// Node pool id
        id: String,

        /// Request body (JSON string or @file); unset fields are left untouched
        #[arg(long)]
        data: String,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Delete a node pool by id, or by name within a cluster
    #[command(visible_alias = "rm")]
    Delete {
        /// Node pool id
        #[arg(required_unless_present = "name", conflicts_with = "name")]
        id: Option<String>,

        /// Cluster to search by name
        #[arg(long, requires = "name")]
        cluster_id: Option<String>,

        /// Node pool name; a missing pool is not an error
        #[arg(long, requires = "cluster_id")]
        name: Option<String>,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Check whether every node of a pool is ACTIVE (exit status 1 when not)
    Ready {
        /// Node pool id
        id: String,
    },

    /// Show images, Kubernetes versions and shapes available for node pools
    Options {
        /// Cluster id (defaults to options valid for every cluster)
        #[arg(long)]
        cluster_id: Option<String>,
    },
}
