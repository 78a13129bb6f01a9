use super::DefaultValue::{Bool, EmptyList, Int, Str};
use super::{Body, Column, Counter, Field, FieldKind as K, ObjectKind, Statistics};

const BASIC: &str = super::BASIC_SECTION;

const LB_ALGORITHMS: &[&str] = &[
    "fastest_response_time",
    "least_connections",
    "perceptive",
    "random",
    "round_robin",
    "weighted_least_connections",
    "weighted_round_robin",
];

const NODE_STATES: &[&str] = &["active", "disabled", "draining"];

const NODE_COLUMNS: &[Column] = &[
    Column::new("node", K::String),
    Column::new("priority", K::Int),
    Column::new("state", K::String).allowed(NODE_STATES),
    Column::new("weight", K::Int),
];

const POOL_FIELDS: &[Field] = &[
    Field::new(BASIC, "monitors", K::StringList, "Monitors assigned to this pool")
        .default(EmptyList),
    Field::new(
        BASIC,
        "nodes_table",
        K::Table(NODE_COLUMNS),
        "Nodes in this pool with their priority, state and weight",
    )
    .default(EmptyList),
    Field::new(BASIC, "note", K::String, "A description of the pool").default(Str("")),
    Field::new(
        BASIC,
        "passive_monitoring",
        K::Bool,
        "Mark a node as failed when a connection to it fails",
    )
    .default(Bool(true)),
    Field::new(
        BASIC,
        "max_connection_attempts",
        K::Int,
        "Maximum number of nodes a request is tried against",
    )
    .default(Int(0)),
    Field::new(
        BASIC,
        "node_connection_attempts",
        K::Int,
        "Connection attempts before a node is marked as failed",
    )
    .default(Int(3)),
    Field::new(
        BASIC,
        "failure_pool",
        K::String,
        "Pool used when all nodes in this pool have failed",
    ),
    Field::new(BASIC, "persistence_class", K::String, "Session persistence class"),
    Field::new(
        "load_balancing",
        "algorithm",
        K::String,
        "Load balancing algorithm",
    )
    .default(Str("round_robin"))
    .allowed(LB_ALGORITHMS),
    Field::new(
        "load_balancing",
        "priority_enabled",
        K::Bool,
        "Use priority lists for load balancing",
    )
    .default(Bool(false)),
    Field::new(
        "connection",
        "max_connect_time",
        K::Int,
        "Seconds to wait for a connection to a node",
    )
    .default(Int(4)),
    Field::new(
        "connection",
        "max_reply_time",
        K::Int,
        "Seconds to wait for a node to reply",
    )
    .default(Int(30)),
    Field::new("http", "keepalive", K::Bool, "Reuse HTTP connections to nodes")
        .default(Bool(true)),
    Field::new("tcp", "nagle", K::Bool, "Use Nagle's algorithm for node connections")
        .default(Bool(true)),
];

const POOL_COUNTERS: &[Counter] = &[
    Counter {
        name: "algorithm",
        kind: K::String,
        description: "Load balancing algorithm in use",
    },
    Counter {
        name: "bytes_in",
        kind: K::Int,
        description: "Bytes received by the pool from its nodes",
    },
    Counter {
        name: "bytes_out",
        kind: K::Int,
        description: "Bytes sent by the pool to its nodes",
    },
    Counter {
        name: "conns_queued",
        kind: K::Int,
        description: "Connections currently queued",
    },
    Counter {
        name: "disabled",
        kind: K::Int,
        description: "Number of disabled nodes",
    },
    Counter {
        name: "draining",
        kind: K::Int,
        description: "Number of draining nodes",
    },
    Counter {
        name: "nodes",
        kind: K::Int,
        description: "Number of nodes in the pool",
    },
    Counter {
        name: "state",
        kind: K::String,
        description: "State of the pool",
    },
    Counter {
        name: "total_conn",
        kind: K::Int,
        description: "Requests sent to the pool",
    },
];

const PROTOCOLS: &[&str] = &[
    "client_first",
    "dns",
    "ftp",
    "http",
    "https",
    "imaps",
    "ldap",
    "pop3",
    "server_first",
    "siptcp",
    "sipudp",
    "smtp",
    "ssl",
    "stream",
    "udp",
];

const VIRTUAL_SERVER_FIELDS: &[Field] = &[
    Field::new(BASIC, "pool", K::String, "Default pool for traffic").required(),
    Field::new(BASIC, "port", K::Int, "Port the virtual server listens on")
        .required()
        .range(1, 65535),
    Field::new(BASIC, "enabled", K::Bool, "Whether the virtual server is enabled")
        .default(Bool(false)),
    Field::new(BASIC, "protocol", K::String, "Protocol of the virtual server")
        .default(Str("http"))
        .allowed(PROTOCOLS),
    Field::new(BASIC, "listen_on_any", K::Bool, "Listen on all addresses")
        .default(Bool(true)),
    Field::new(
        BASIC,
        "listen_on_traffic_ips",
        K::StringList,
        "Traffic IP groups to listen on",
    )
    .default(EmptyList),
    Field::new(BASIC, "request_rules", K::StringList, "Rules run on requests")
        .default(EmptyList),
    Field::new(BASIC, "response_rules", K::StringList, "Rules run on responses")
        .default(EmptyList),
    Field::new(BASIC, "ssl_decrypt", K::Bool, "Decrypt SSL traffic").default(Bool(false)),
    Field::new(BASIC, "note", K::String, "A description of the virtual server")
        .default(Str("")),
    Field::new(
        "connection",
        "timeout",
        K::Int,
        "Seconds an idle client connection is kept open",
    )
    .default(Int(300)),
    Field::new("log", "enabled", K::Bool, "Write a request log").default(Bool(false)),
    Field::new("log", "filename", K::String, "Request log file name")
        .default(Str("%zeushome%/zxtm/log/%v.log")),
];

const VIRTUAL_SERVER_COUNTERS: &[Counter] = &[
    Counter {
        name: "bytes_in",
        kind: K::Int,
        description: "Bytes received from clients",
    },
    Counter {
        name: "bytes_out",
        kind: K::Int,
        description: "Bytes sent to clients",
    },
    Counter {
        name: "current_conn",
        kind: K::Int,
        description: "Open client connections",
    },
    Counter {
        name: "max_conn",
        kind: K::Int,
        description: "Maximum simultaneous client connections",
    },
    Counter {
        name: "total_conn",
        kind: K::Int,
        description: "Requests received",
    },
    Counter {
        name: "discard",
        kind: K::Int,
        description: "Connections discarded",
    },
    Counter {
        name: "connect_timed_out",
        kind: K::Int,
        description: "Connections closed because of a connect timeout",
    },
];

const MONITOR_TYPES: &[&str] = &[
    "connect",
    "http",
    "ping",
    "program",
    "rtsp",
    "sip",
    "tcp_transaction",
];

const ARGUMENT_COLUMNS: &[Column] = &[
    Column::new("name", K::String),
    Column::new("value", K::String),
    Column::new("description", K::String),
];

const MONITOR_FIELDS: &[Field] = &[
    Field::new(BASIC, "type", K::String, "Monitor type")
        .default(Str("ping"))
        .allowed(MONITOR_TYPES),
    Field::new(BASIC, "delay", K::Int, "Seconds between health checks").default(Int(3)),
    Field::new(BASIC, "timeout", K::Int, "Seconds before a check fails").default(Int(3)),
    Field::new(
        BASIC,
        "failures",
        K::Int,
        "Consecutive failures before a node is marked failed",
    )
    .default(Int(3)),
    Field::new(BASIC, "scope", K::String, "Monitor each node or the pool as a whole")
        .default(Str("pernode"))
        .allowed(&["pernode", "poolwide"]),
    Field::new(BASIC, "machine", K::String, "Machine to monitor for poolwide monitors"),
    Field::new(BASIC, "use_ssl", K::Bool, "Connect using SSL").default(Bool(false)),
    Field::new(BASIC, "verbose", K::Bool, "Log check results").default(Bool(false)),
    Field::new(BASIC, "note", K::String, "A description of the monitor").default(Str("")),
    Field::new("http", "path", K::String, "Path requested by HTTP monitors").default(Str("/")),
    Field::new(
        "http",
        "status_regex",
        K::String,
        "Regular expression the HTTP status code must match",
    )
    .default(Str("^[234][0-9][0-9]$")),
    Field::new(
        "http",
        "body_regex",
        K::String,
        "Regular expression the response body must match",
    ),
    Field::new("http", "host_header", K::String, "Host header sent by HTTP monitors"),
    Field::new(
        "http",
        "authentication",
        K::String,
        "Basic authentication credentials, user:password",
    )
    .sensitive(),
    Field::new("script", "program", K::String, "Program run by program monitors"),
    Field::new(
        "script",
        "arguments",
        K::Table(ARGUMENT_COLUMNS),
        "Arguments passed to the monitor program",
    )
    .default(EmptyList),
];

const TRAFFIC_IP_MODES: &[&str] = &[
    "ec2elastic",
    "ec2vpcelastic",
    "ec2vpcprivate",
    "gceexternal",
    "multihosted",
    "rhi",
    "singlehosted",
];

const TRAFFIC_IP_GROUP_FIELDS: &[Field] = &[
    Field::new(BASIC, "enabled", K::Bool, "Whether the group is enabled").default(Bool(true)),
    Field::new(
        BASIC,
        "ipaddresses",
        K::StringList,
        "IP addresses raised by this group",
    )
    .default(EmptyList),
    Field::new(
        BASIC,
        "machines",
        K::StringList,
        "Traffic managers that may raise the addresses",
    )
    .default(EmptyList),
    Field::new(BASIC, "mode", K::String, "How the addresses are raised")
        .default(Str("singlehosted"))
        .allowed(TRAFFIC_IP_MODES),
    Field::new(
        BASIC,
        "keeptogether",
        K::Bool,
        "Raise all addresses on the same machine",
    )
    .default(Bool(false)),
    Field::new(BASIC, "multicast", K::String, "Multicast address for multihosted mode"),
    Field::new(BASIC, "note", K::String, "A description of the group").default(Str("")),
    Field::new(
        BASIC,
        "slaves",
        K::StringList,
        "Passive machines that only raise addresses on failure",
    )
    .default(EmptyList),
];

const PERSISTENCE_TYPES: &[&str] = &[
    "asp",
    "cookie",
    "ip",
    "j2ee",
    "named",
    "ssl",
    "transparent",
    "universal",
    "x_zeus_backend",
];

const PERSISTENCE_FIELDS: &[Field] = &[
    Field::new(BASIC, "type", K::String, "Session persistence method")
        .default(Str("ip"))
        .allowed(PERSISTENCE_TYPES),
    Field::new(BASIC, "cookie", K::String, "Cookie used by cookie persistence"),
    Field::new(BASIC, "delete", K::Bool, "Delete the session when the node fails")
        .default(Bool(true)),
    Field::new(
        BASIC,
        "failure_mode",
        K::String,
        "What to do when the persistent node fails",
    )
    .default(Str("new_node"))
    .allowed(&["close", "new_node", "url"]),
    Field::new(BASIC, "url", K::String, "Redirect URL for the url failure mode"),
    Field::new(BASIC, "note", K::String, "A description of the class").default(Str("")),
];

const SSL_SERVER_KEY_FIELDS: &[Field] = &[
    Field::new(BASIC, "public", K::String, "PEM encoded public certificate").required(),
    Field::new(BASIC, "private", K::String, "PEM encoded private key")
        .required()
        .sensitive(),
    Field::new(BASIC, "request", K::String, "PEM encoded certificate signing request"),
    Field::new(BASIC, "note", K::String, "A description of the key").default(Str("")),
];

const USER_AUTHENTICATOR_FIELDS: &[Field] = &[
    Field::new(BASIC, "type", K::String, "Authentication service")
        .required()
        .allowed(&["ldap", "radius", "tacacs_plus"]),
    Field::new(BASIC, "enabled", K::Bool, "Whether the authenticator is used")
        .default(Bool(false)),
    Field::new(BASIC, "description", K::String, "A description of the authenticator")
        .default(Str("")),
    Field::new("ldap", "server", K::String, "LDAP server host name or address"),
    Field::new("ldap", "port", K::Int, "LDAP server port")
        .default(Int(389))
        .range(1, 65535),
    Field::new("ldap", "base_dn", K::String, "Base DN for user searches"),
    Field::new("ldap", "bind_dn", K::String, "DN used to bind for searches"),
    Field::new("ldap", "bind_password", K::String, "Password for the bind DN").sensitive(),
    Field::new("ldap", "filter", K::String, "Filter that selects the user"),
    Field::new("ldap", "ssl_type", K::String, "How the LDAP connection is secured")
        .default(Str("disabled"))
        .allowed(&["disabled", "ldaps", "starttls"]),
    Field::new("radius", "server", K::String, "RADIUS server host name or address"),
    Field::new("radius", "port", K::Int, "RADIUS server port")
        .default(Int(1812))
        .range(1, 65535),
    Field::new("radius", "secret", K::String, "RADIUS shared secret").sensitive(),
    Field::new("tacacs_plus", "server", K::String, "TACACS+ server host name or address"),
    Field::new("tacacs_plus", "port", K::Int, "TACACS+ server port")
        .default(Int(49))
        .range(1, 65535),
    Field::new("tacacs_plus", "secret", K::String, "TACACS+ shared secret").sensitive(),
];

const SAML_TRUSTEDIDP_FIELDS: &[Field] = &[
    Field::new(BASIC, "certificate", K::String, "Certificate of the identity provider")
        .required(),
    Field::new(BASIC, "url", K::String, "Single sign-on URL of the identity provider")
        .required(),
    Field::new(BASIC, "entity_id", K::String, "Entity ID of the identity provider").required(),
    Field::new(BASIC, "add_zlib_header", K::Bool, "Add a zlib header to requests")
        .default(Bool(false)),
    Field::new(BASIC, "strict_verify", K::Bool, "Verify assertion conditions strictly")
        .default(Bool(true)),
    Field::new(
        BASIC,
        "time_tolerance",
        K::Int,
        "Allowed clock skew in seconds",
    )
    .default(Int(5)),
];

pub static KINDS: &[ObjectKind] = &[
    ObjectKind {
        name: "pool",
        path: "pools",
        description: "A pool of back-end nodes that traffic is balanced across",
        body: Body::Properties(POOL_FIELDS),
        statistics: Some(Statistics {
            path: "pools",
            counters: POOL_COUNTERS,
        }),
    },
    ObjectKind {
        name: "virtual_server",
        path: "virtual_servers",
        description: "A virtual server that accepts client traffic and passes it to a pool",
        body: Body::Properties(VIRTUAL_SERVER_FIELDS),
        statistics: Some(Statistics {
            path: "virtual_servers",
            counters: VIRTUAL_SERVER_COUNTERS,
        }),
    },
    ObjectKind {
        name: "monitor",
        path: "monitors",
        description: "A health monitor for pool nodes",
        body: Body::Properties(MONITOR_FIELDS),
        statistics: None,
    },
    ObjectKind {
        name: "traffic_ip_group",
        path: "traffic_ip_groups",
        description: "A group of traffic IP addresses shared by traffic managers",
        body: Body::Properties(TRAFFIC_IP_GROUP_FIELDS),
        statistics: None,
    },
    ObjectKind {
        name: "persistence",
        path: "persistence",
        description: "A session persistence class",
        body: Body::Properties(PERSISTENCE_FIELDS),
        statistics: None,
    },
    ObjectKind {
        name: "ssl_server_key",
        path: "ssl/server_keys",
        description: "An SSL certificate and private key used by virtual servers",
        body: Body::Properties(SSL_SERVER_KEY_FIELDS),
        statistics: None,
    },
    ObjectKind {
        name: "user_authenticator",
        path: "user_authenticators",
        description: "A remote authentication service for administrators",
        body: Body::Properties(USER_AUTHENTICATOR_FIELDS),
        statistics: None,
    },
    ObjectKind {
        name: "saml_trustedidp",
        path: "saml/trustedidps",
        description: "A trusted SAML identity provider",
        body: Body::Properties(SAML_TRUSTEDIDP_FIELDS),
        statistics: None,
    },
    ObjectKind {
        name: "rule",
        path: "rules",
        description: "A TrafficScript rule",
        body: Body::Raw,
        statistics: None,
    },
    ObjectKind {
        name: "monitor_script",
        path: "monitor_scripts",
        description: "A program used by program monitors",
        body: Body::Raw,
        statistics: None,
    },
    ObjectKind {
        name: "extra_file",
        path: "extra_files",
        description: "A miscellaneous file available to rules",
        body: Body::Raw,
        statistics: None,
    },
    ObjectKind {
        name: "servicediscovery",
        path: "servicediscovery",
        description: "A service discovery plugin",
        body: Body::Raw,
        statistics: None,
    },
    ObjectKind {
        name: "license_key",
        path: "license_keys",
        description: "A license key",
        body: Body::Raw,
        statistics: None,
    },
];
