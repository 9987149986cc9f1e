//! Contract bindings for the verifier-backed token.
//!
//! The token exposes the same read accessors and `Minted` event whichever
//! verifier it was deployed with; only `mintNFT` differs between the PLONK and
//! Groth16 deployments, so each shape gets its own binding.

use ethers::contract::abigen;

abigen!(
    MintToken,
    r#"[
        function tokenIdCounter() external view returns (uint256)
        function ownerOf(uint256 tokenId) external view returns (address)
        function tokenURI(uint256 tokenId) external view returns (string)
        event Minted(uint256 tokenId, address owner, string tokenURI)
    ]"#
);

pub mod plonk {
    use ethers::contract::abigen;

    abigen!(
        PlonkMinter,
        r#"[
            function mintNFT(bytes proofBytes, uint256[] signals) external
        ]"#
    );
}

pub mod groth16 {
    use ethers::contract::abigen;

    abigen!(
        Groth16Minter,
        r#"[
            function mintNFT(uint256[2] a, uint256[2][2] b, uint256[2] c, uint256[] signals) external
        ]"#
    );
}
