//! Domain Constants
//!
//! Configuration keys read by the supervision core and their defaults

pub const PATH_HOME: &str = "sonar.path.home";
pub const PATH_DATA: &str = "sonar.path.data";
pub const PATH_LOGS: &str = "sonar.path.logs";
pub const PATH_TEMP: &str = "sonar.path.temp";

pub const SEARCH_HOST: &str = "sonar.search.host";
pub const SEARCH_PORT: &str = "sonar.search.port";
pub const SEARCH_HTTP_PORT: &str = "sonar.search.httpPort";
pub const SEARCH_JAVA_OPTS: &str = "sonar.search.javaOpts";
pub const SEARCH_JAVA_ADDITIONAL_OPTS: &str = "sonar.search.javaAdditionalOpts";

pub const WEB_JAVA_OPTS: &str = "sonar.web.javaOpts";
pub const WEB_JAVA_ADDITIONAL_OPTS: &str = "sonar.web.javaAdditionalOpts";
pub const CE_JAVA_OPTS: &str = "sonar.ce.javaOpts";
pub const CE_JAVA_ADDITIONAL_OPTS: &str = "sonar.ce.javaAdditionalOpts";

pub const CLUSTER_NAME: &str = "sonar.cluster.name";
pub const CLUSTER_NODE_NAME: &str = "sonar.cluster.node.name";
pub const CLUSTER_WEB_STARTUP_LEADER: &str = "sonar.cluster.web.startupLeader";

pub const JDBC_DRIVER_PATH: &str = "sonar.jdbc.driverPath";

pub const LOG_LEVEL: &str = "sonar.log.level";
pub const SEARCH_LOG_LEVEL: &str = "sonar.log.level.es";

pub const HTTP_PROXY_HOST: &str = "http.proxyHost";
pub const HTTP_PROXY_PORT: &str = "http.proxyPort";
pub const HTTPS_PROXY_HOST: &str = "https.proxyHost";
pub const HTTPS_PROXY_PORT: &str = "https.proxyPort";

/// Proxy settings forwarded to the JVM processes as system properties, in emission order.
pub const PROXY_PROPERTY_KEYS: [&str; 8] = [
    HTTP_PROXY_HOST,
    HTTP_PROXY_PORT,
    "http.nonProxyHosts",
    HTTPS_PROXY_HOST,
    HTTPS_PROXY_PORT,
    "http.auth.ntlm.domain",
    "socksProxyHost",
    "socksProxyPort",
];

/// Keys holding paths that are resolved against the home directory when relative.
pub const PATH_KEYS: [&str; 3] = [PATH_DATA, PATH_LOGS, PATH_TEMP];

/// Values applied for keys missing from the configuration.
pub const DEFAULTS: [(&str, &str); 14] = [
    (PATH_DATA, "data"),
    (PATH_LOGS, "logs"),
    (PATH_TEMP, "temp"),
    (SEARCH_HOST, "127.0.0.1"),
    (SEARCH_PORT, "9001"),
    (SEARCH_HTTP_PORT, "9002"),
    (
        SEARCH_JAVA_OPTS,
        "-Xms512m -Xmx512m -XX:+HeapDumpOnOutOfMemoryError",
    ),
    (SEARCH_JAVA_ADDITIONAL_OPTS, ""),
    (WEB_JAVA_OPTS, "-Xmx512m -Xms128m -XX:+HeapDumpOnOutOfMemoryError"),
    (WEB_JAVA_ADDITIONAL_OPTS, ""),
    (CE_JAVA_OPTS, "-Xmx512m -Xms128m -XX:+HeapDumpOnOutOfMemoryError"),
    (CE_JAVA_ADDITIONAL_OPTS, ""),
    (CLUSTER_NAME, "sonarqube"),
    (CLUSTER_NODE_NAME, "sonarqube"),
];
