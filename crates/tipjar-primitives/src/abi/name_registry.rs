use alloy::sol;

sol! {
    /// ENS-compatible registry, as deployed for Basenames.
    #[sol(rpc)]
    #[derive(Debug)]
    interface NameRegistry {
        function resolver(bytes32 node) external view returns (address resolverAddress);
    }

    /// Address resolver referenced by a registry record.
    #[sol(rpc)]
    #[derive(Debug)]
    interface AddrResolver {
        function addr(bytes32 node) external view returns (address resolvedAddress);
    }
}
