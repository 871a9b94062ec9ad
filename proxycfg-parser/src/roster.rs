//! Directive rosters per section kind
//!
//! A roster is the ordered list of parsers a fresh section starts with. Order
//! matters: the dispatcher gives a line to the first parser that accepts it,
//! so specific forms (`option httplog`) come before general ones (`option`).
//! Every roster opens with the section declaration parsers and the comment
//! collector, and closes with the catch-all.

use crate::directive::{Directive, Flag, List, Scalar, SectionDecl};
use proxycfg_core::SectionKind;

/// Fresh, empty parsers for a section of `kind`
pub fn roster(kind: SectionKind) -> Vec<Directive> {
    let mut parsers = head();
    parsers.extend(match kind {
        SectionKind::Comments => Vec::new(),
        SectionKind::Global => global(),
        SectionKind::Defaults => proxy(ProxyRole::Defaults),
        SectionKind::Frontend => proxy(ProxyRole::Frontend),
        SectionKind::Backend => proxy(ProxyRole::Backend),
        SectionKind::Listen => proxy(ProxyRole::Listen),
        SectionKind::Resolvers => resolvers(),
        SectionKind::UserList => userlist(),
        SectionKind::Peers => peers(),
        SectionKind::Mailers => mailers(),
        SectionKind::Cache => cache(),
        SectionKind::Program => program(),
    });
    parsers.push(List::unprocessed().into());
    parsers
}

fn head() -> Vec<Directive> {
    let mut parsers: Vec<Directive> = SectionKind::ALL
        .into_iter()
        .filter(|kind| kind.is_declarable())
        .map(|kind| SectionDecl::new(kind).into())
        .collect();
    parsers.push(List::comments().into());
    parsers
}

fn global() -> Vec<Directive> {
    vec![
        Flag::new("daemon").into(),
        Flag::new("master-worker").into(),
        Scalar::number("maxconn").into(),
        Scalar::number("nbthread").into(),
        Scalar::number("ulimit-n").into(),
        Scalar::word("pidfile").into(),
        Scalar::word("chroot").into(),
        Scalar::word("user").into(),
        Scalar::word("group").into(),
        List::args("stats socket").into(),
        Scalar::word("stats timeout").into(),
        List::args("cpu-map").into(),
        Scalar::word("ssl-default-bind-ciphers").into(),
        Scalar::words("ssl-default-bind-options").into(),
        Scalar::number("tune.ssl.default-dh-param").into(),
        List::args("lua-load").into(),
        List::args("log").into(),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProxyRole {
    Defaults,
    Frontend,
    Backend,
    Listen,
}

impl ProxyRole {
    fn frontend(self) -> bool {
        matches!(self, ProxyRole::Defaults | ProxyRole::Frontend | ProxyRole::Listen)
    }

    fn backend(self) -> bool {
        matches!(self, ProxyRole::Defaults | ProxyRole::Backend | ProxyRole::Listen)
    }

    fn named(self) -> bool {
        self != ProxyRole::Defaults
    }
}

fn proxy(role: ProxyRole) -> Vec<Directive> {
    let mut parsers: Vec<Directive> = vec![Scalar::word("mode").into()];
    let mut add = |enabled: bool, parser: Directive| {
        if enabled {
            parsers.push(parser);
        }
    };
    let (fe, be, named) = (role.frontend(), role.backend(), role.named());

    add(fe, Scalar::number("maxconn").into());
    add(named, Scalar::words("description").into());
    add(fe && named, List::binds().into());
    add(be, Scalar::words("balance").into());

    add(fe, Flag::negatable("option httplog").into());
    add(true, Flag::negatable("option tcplog").into());
    add(fe, Flag::negatable("option dontlognull").into());
    add(true, Flag::negatable("option http-keep-alive").into());
    add(true, Flag::negatable("option http-server-close").into());
    add(true, Flag::negatable("option forwardfor").into());
    add(be, Flag::negatable("option redispatch").into());
    add(be, Scalar::words("option httpchk").into());
    add(true, List::args("option").into());

    add(be, Scalar::word("timeout connect").into());
    add(fe, Scalar::word("timeout client").into());
    add(be, Scalar::word("timeout server").into());
    add(fe, Scalar::word("timeout http-request").into());
    add(true, Scalar::word("timeout http-keep-alive").into());
    add(be, Scalar::word("timeout queue").into());
    add(be, Scalar::word("timeout check").into());
    add(be, Scalar::word("timeout tunnel").into());
    add(be, Scalar::number("retries").into());

    add(true, List::args("log").into());
    add(named, List::args("acl").into());
    add(named, List::args("http-request").into());
    add(named, List::args("http-response").into());
    add(fe && named, List::args("use_backend").into());
    add(fe, Scalar::word("default_backend").into());
    add(be, Scalar::words("cookie").into());
    add(be && named, Scalar::words("hash-type").into());
    add(be, List::args("default-server").into());
    add(be && named, List::servers().into());
    add(true, List::args("errorfile").into());
    add(named, List::args("stats").into());
    parsers
}

fn resolvers() -> Vec<Directive> {
    vec![
        List::args("nameserver").into(),
        Flag::new("parse-resolv-conf").into(),
        Scalar::number("resolve_retries").into(),
        Scalar::word("timeout resolve").into(),
        Scalar::word("timeout retry").into(),
        List::args("hold").into(),
        Scalar::number("accepted_payload_size").into(),
    ]
}

fn userlist() -> Vec<Directive> {
    vec![List::args("group").into(), List::args("user").into()]
}

fn peers() -> Vec<Directive> {
    vec![Flag::new("disabled").into(), List::args("peer").into()]
}

fn mailers() -> Vec<Directive> {
    vec![List::args("mailer").into(), Scalar::word("timeout mail").into()]
}

fn cache() -> Vec<Directive> {
    vec![
        Scalar::number("total-max-size").into(),
        Scalar::number("max-object-size").into(),
        Scalar::number("max-age").into(),
        Scalar::word("process-vary").into(),
    ]
}

fn program() -> Vec<Directive> {
    vec![
        Scalar::words("command").into(),
        Scalar::word("user").into(),
        Scalar::word("group").into(),
        Flag::negatable("option start-on-reload").into(),
    ]
}
